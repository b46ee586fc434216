use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::core::types::{BarcodeId, OTHER_LABEL};
use crate::utils::validation::{is_valid_dna, normalize_sequence};

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Failed to read reference file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse reference file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Duplicate barcode {barcode} (line {line}, first seen as '{first_label}')")]
    DuplicateBarcode {
        barcode: String,
        line: usize,
        first_label: String,
    },

    #[error("Malformed reference record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("Reference file contains no barcodes")]
    Empty,
}

/// A known barcode and the gene/strain it tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEntry {
    /// Uppercase barcode sequence
    pub sequence: String,

    /// Gene or strain name
    pub label: String,
}

/// The ordered set of known barcodes.
///
/// Load order is preserved: it drives the first-match resolution policy and
/// the row order of output tables. The reserved `_other` entry is always
/// present and always last.
#[derive(Debug, Clone)]
pub struct ReferenceLibrary {
    entries: Vec<LibraryEntry>,
    index: HashMap<String, BarcodeId>,
}

impl ReferenceLibrary {
    /// Build a library from `(line, sequence, label)` records.
    ///
    /// `line` is only used for error messages. Sequences are uppercased.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::DuplicateBarcode` when a sequence repeats,
    /// `LibraryError::MalformedRecord` for empty or non-ACGT sequences and
    /// empty labels, and `LibraryError::Empty` when no records are given.
    pub fn from_records<I, S, L>(records: I) -> Result<Self, LibraryError>
    where
        I: IntoIterator<Item = (usize, S, L)>,
        S: AsRef<str>,
        L: AsRef<str>,
    {
        let mut entries: Vec<LibraryEntry> = Vec::new();
        let mut index = HashMap::new();

        for (line, sequence, label) in records {
            let sequence = normalize_sequence(sequence.as_ref());
            let label = label.as_ref().trim().to_string();

            if !is_valid_dna(sequence.as_bytes()) {
                return Err(LibraryError::MalformedRecord {
                    line,
                    reason: format!("barcode '{sequence}' is not a non-empty A/C/G/T sequence"),
                });
            }
            if label.is_empty() {
                return Err(LibraryError::MalformedRecord {
                    line,
                    reason: format!("barcode {sequence} has an empty label"),
                });
            }
            if let Some(&BarcodeId(first)) = index.get(&sequence) {
                return Err(LibraryError::DuplicateBarcode {
                    barcode: sequence,
                    line,
                    first_label: entries[first].label.clone(),
                });
            }

            index.insert(sequence.clone(), BarcodeId(entries.len()));
            entries.push(LibraryEntry { sequence, label });
        }

        if entries.is_empty() {
            return Err(LibraryError::Empty);
        }

        entries.push(LibraryEntry {
            sequence: OTHER_LABEL.to_string(),
            label: OTHER_LABEL.to_string(),
        });

        Ok(Self { entries, index })
    }

    /// Known barcodes in load order, without the reserved entry
    pub fn barcodes(&self) -> &[LibraryEntry] {
        &self.entries[..self.entries.len() - 1]
    }

    /// All entries in output order, `_other` last
    pub fn entries(&self) -> &[LibraryEntry] {
        &self.entries
    }

    /// Identifier of the reserved `_other` entry
    pub fn other_id(&self) -> BarcodeId {
        BarcodeId(self.entries.len() - 1)
    }

    pub fn get(&self, id: BarcodeId) -> Option<&LibraryEntry> {
        self.entries.get(id.index())
    }

    /// Exact lookup of an (uppercase) barcode sequence
    pub fn find(&self, sequence: &str) -> Option<BarcodeId> {
        self.index.get(sequence).copied()
    }

    /// Number of known barcodes, not counting `_other`
    pub fn len(&self) -> usize {
        self.entries.len() - 1
    }

    /// True when no barcodes besides `_other` are loaded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Barcode lengths that differ from `expected`, for configuration warnings
    pub fn mismatched_lengths(&self, expected: usize) -> Vec<&LibraryEntry> {
        self.barcodes()
            .iter()
            .filter(|e| e.sequence.len() != expected)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(rows: &[(&'static str, &'static str)]) -> Vec<(usize, &'static str, &'static str)> {
        rows.iter()
            .enumerate()
            .map(|(i, (s, l))| (i + 2, *s, *l))
            .collect()
    }

    #[test]
    fn test_other_is_appended_last() {
        let library = ReferenceLibrary::from_records(records(&[
            ("aggGCCATTTATATACC", "gene1::bar1"),
            ("AGGGCCAGGGATATACC", "gene2::bar2"),
        ]))
        .unwrap();

        assert_eq!(library.len(), 2);
        assert!(!library.is_empty());
        assert_eq!(library.entries().len(), 3);
        assert_eq!(library.barcodes()[0].sequence, "AGGGCCATTTATATACC");
        let other = library.get(library.other_id()).unwrap();
        assert_eq!(other.label, OTHER_LABEL);
        assert_eq!(library.find("AGGGCCAGGGATATACC"), Some(BarcodeId(1)));
        assert_eq!(library.find(OTHER_LABEL), None);
    }

    #[test]
    fn test_duplicate_barcode_fails() {
        let result = ReferenceLibrary::from_records(records(&[
            ("AGGGCCATTTATATACC", "gene1"),
            ("agggccatttatatacc", "gene2"),
        ]));

        match result {
            Err(LibraryError::DuplicateBarcode {
                barcode,
                line,
                first_label,
            }) => {
                assert_eq!(barcode, "AGGGCCATTTATATACC");
                assert_eq!(line, 3);
                assert_eq!(first_label, "gene1");
            }
            other => panic!("expected duplicate error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_records() {
        assert!(matches!(
            ReferenceLibrary::from_records(records(&[("ACGTN", "gene1")])),
            Err(LibraryError::MalformedRecord { line: 2, .. })
        ));
        assert!(matches!(
            ReferenceLibrary::from_records(records(&[("ACGT", "  ")])),
            Err(LibraryError::MalformedRecord { .. })
        ));
        assert!(matches!(
            ReferenceLibrary::from_records(records(&[])),
            Err(LibraryError::Empty)
        ));
    }

    #[test]
    fn test_mismatched_lengths() {
        let library =
            ReferenceLibrary::from_records(records(&[("ACGTACGT", "a"), ("ACGTAC", "b")]))
                .unwrap();
        let odd = library.mismatched_lengths(8);
        assert_eq!(odd.len(), 1);
        assert_eq!(odd[0].label, "b");
    }
}
