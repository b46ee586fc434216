use serde::Serialize;
use std::collections::HashMap;

use crate::core::library::ReferenceLibrary;
use crate::core::types::{ClassificationOutcome, NO_BARCODE_FOUND, OTHER_LABEL};

#[derive(Debug)]
enum Counts {
    /// One slot per library entry; the last slot is `_other`
    Reference { labels: Vec<(String, String)>, counts: Vec<u64> },
    ReferenceFree { candidates: HashMap<String, u64>, no_barcode_found: u64 },
}

/// Accumulates classification outcomes for one sample.
///
/// A counter is owned by the worker processing the sample and is never
/// shared. Every recorded outcome lands in exactly one bucket. Call
/// [`SampleCounter::finish`] once the read stream is exhausted; a counter
/// that is dropped instead (aborted stream) never produces a table.
#[derive(Debug)]
pub struct SampleCounter {
    sample: String,
    counts: Counts,
    total_reads: u64,
    no_flank: u64,
}

impl SampleCounter {
    /// Create an empty counter. With a library, every barcode is pre-seeded
    /// at zero; without one the counter runs in reference-free mode.
    pub fn new(sample: impl Into<String>, library: Option<&ReferenceLibrary>) -> Self {
        let counts = match library {
            Some(library) => Counts::Reference {
                labels: library
                    .entries()
                    .iter()
                    .map(|e| (e.sequence.clone(), e.label.clone()))
                    .collect(),
                counts: vec![0; library.entries().len()],
            },
            None => Counts::ReferenceFree {
                candidates: HashMap::new(),
                no_barcode_found: 0,
            },
        };

        Self {
            sample: sample.into(),
            counts,
            total_reads: 0,
            no_flank: 0,
        }
    }

    /// Count one read
    pub fn record(&mut self, outcome: ClassificationOutcome) {
        self.total_reads += 1;
        if matches!(
            outcome,
            ClassificationOutcome::UnmatchedNoFlank | ClassificationOutcome::NoFlankMatch
        ) {
            self.no_flank += 1;
        }

        match &mut self.counts {
            Counts::Reference { counts, .. } => {
                let other = counts.len() - 1;
                let slot = match outcome {
                    ClassificationOutcome::Matched(id) if id.index() < other => id.index(),
                    _ => other,
                };
                counts[slot] += 1;
            }
            Counts::ReferenceFree {
                candidates,
                no_barcode_found,
            } => match outcome {
                ClassificationOutcome::CandidateFound(region) => {
                    *candidates.entry(region).or_insert(0) += 1;
                }
                _ => *no_barcode_found += 1,
            },
        }
    }

    pub fn total_reads(&self) -> u64 {
        self.total_reads
    }

    /// Freeze the counts into a read-only table
    pub fn finish(self) -> SampleCountTable {
        let (rows, unmatched, reference_free) = match self.counts {
            Counts::Reference { labels, counts } => {
                let unmatched = counts.last().copied().unwrap_or(0);
                let rows = labels
                    .into_iter()
                    .zip(counts)
                    .map(|((key, label), count)| CountRow { key, label, count })
                    .collect();
                (rows, unmatched, false)
            }
            Counts::ReferenceFree {
                candidates,
                no_barcode_found,
            } => {
                let mut rows: Vec<CountRow> = candidates
                    .into_iter()
                    .map(|(key, count)| CountRow {
                        label: key.clone(),
                        key,
                        count,
                    })
                    .collect();
                rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
                rows.push(CountRow {
                    key: NO_BARCODE_FOUND.to_string(),
                    label: NO_BARCODE_FOUND.to_string(),
                    count: no_barcode_found,
                });
                (rows, no_barcode_found, true)
            }
        };

        SampleCountTable {
            sample: self.sample,
            reference_free,
            rows,
            total_reads: self.total_reads,
            unmatched,
            no_flank: self.no_flank,
        }
    }
}

/// One counted key and the label it maps to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountRow {
    /// Barcode sequence, or the raw region in reference-free mode
    pub key: String,
    pub label: String,
    pub count: u64,
}

/// Finalized per-sample counts.
///
/// Rows are in output order and the reserved bucket (`_other` or
/// `no_barcode_found`) is always the last row. Reference-free rows are
/// ordered by count descending, then sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleCountTable {
    sample: String,
    reference_free: bool,
    rows: Vec<CountRow>,
    total_reads: u64,
    unmatched: u64,
    no_flank: u64,
}

impl SampleCountTable {
    pub fn sample(&self) -> &str {
        &self.sample
    }

    pub fn is_reference_free(&self) -> bool {
        self.reference_free
    }

    /// All rows, reserved bucket last
    pub fn rows(&self) -> &[CountRow] {
        &self.rows
    }

    /// Rows for real barcodes or candidates, without the reserved bucket
    pub fn classified_rows(&self) -> &[CountRow] {
        &self.rows[..self.rows.len() - 1]
    }

    /// Count for a key; reserved buckets are addressable by their label
    pub fn count(&self, key: &str) -> u64 {
        self.rows
            .iter()
            .find(|row| row.key == key)
            .map_or(0, |row| row.count)
    }

    pub fn total_reads(&self) -> u64 {
        self.total_reads
    }

    /// Reads assigned to a barcode or candidate
    pub fn matched(&self) -> u64 {
        self.total_reads - self.unmatched
    }

    /// Reads in the reserved bucket
    pub fn unmatched(&self) -> u64 {
        self.unmatched
    }

    /// Unmatched reads whose flanks could not be located
    pub fn no_flank(&self) -> u64 {
        self.no_flank
    }

    /// Unmatched reads whose region did not resolve to a known barcode
    pub fn unknown_barcode(&self) -> u64 {
        self.unmatched - self.no_flank
    }

    /// Label of the reserved bucket for this table's mode
    pub fn reserved_label(&self) -> &'static str {
        if self.reference_free {
            NO_BARCODE_FOUND
        } else {
            OTHER_LABEL
        }
    }
}
