use std::path::Path;

use crate::core::library::{LibraryError, ReferenceLibrary};
use crate::parsing::data_records;

/// Pick the delimiter for a reference table from its extension
fn delimiter_for(path: &Path) -> u8 {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("tsv" | "txt") => b'\t',
        _ => b',',
    }
}

/// Load a reference barcode table with columns: barcode, label
///
/// `.tsv`/`.txt` files are tab-delimited, everything else is CSV.
///
/// # Errors
///
/// Returns `LibraryError::Io` if the file cannot be read, or other library
/// errors if the content is invalid.
pub fn load_reference_file(path: &Path) -> Result<ReferenceLibrary, LibraryError> {
    let file = std::fs::File::open(path)?;
    parse_reference(file, delimiter_for(path))
}

/// Parse a reference table from any reader.
///
/// The first line is a header and is always skipped, even when it starts
/// with `#`. Later lines starting with `#` are comments. Extra columns after
/// the label are ignored.
///
/// # Errors
///
/// Returns `LibraryError::Csv` on CSV syntax errors,
/// `LibraryError::MalformedRecord` for rows with fewer than two fields or an
/// invalid barcode, `LibraryError::DuplicateBarcode` when a barcode repeats,
/// and `LibraryError::Empty` when no rows remain.
pub fn parse_reference<R: std::io::Read>(
    reader: R,
    delimiter: u8,
) -> Result<ReferenceLibrary, LibraryError> {
    let mut records = Vec::new();
    for result in data_records(reader, delimiter) {
        let record = result?;
        // Line numbers in errors are 1-based for user friendliness
        let line = record
            .position()
            .map_or(0, |p| usize::try_from(p.line()).unwrap_or(usize::MAX));

        if record.len() < 2 {
            return Err(LibraryError::MalformedRecord {
                line,
                reason: format!("expected 2 fields, found {}", record.len()),
            });
        }
        records.push((line, record[0].to_string(), record[1].to_string()));
    }

    ReferenceLibrary::from_records(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::OTHER_LABEL;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLES_CSV: &str = "\
Barcodes,Gene
AGGGCCATTTATATACC,gene1::bar1
# commented out,ignored
AGGGCCAGGGATATACC,gene2::bar2
accccCATGTATATATC,gene3::bar3
";

    #[test]
    fn test_parse_reference() {
        let library = parse_reference(SAMPLES_CSV.as_bytes(), b',').unwrap();
        let pairs: Vec<(&str, &str)> = library
            .entries()
            .iter()
            .map(|e| (e.sequence.as_str(), e.label.as_str()))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("AGGGCCATTTATATACC", "gene1::bar1"),
                ("AGGGCCAGGGATATACC", "gene2::bar2"),
                ("ACCCCCATGTATATATC", "gene3::bar3"),
                (OTHER_LABEL, OTHER_LABEL),
            ]
        );
    }

    #[test]
    fn test_duplicate_reports_line() {
        let csv = "barcode,gene\nACGTACGT,g1\nTTTTAAAA,g2\nacgtacgt,g3\n";
        match parse_reference(csv.as_bytes(), b',') {
            Err(LibraryError::DuplicateBarcode { barcode, line, .. }) => {
                assert_eq!(barcode, "ACGTACGT");
                assert_eq!(line, 4);
            }
            other => panic!("expected duplicate error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_label_column() {
        let csv = "barcode,gene\nACGTACGT\n";
        assert!(matches!(
            parse_reference(csv.as_bytes(), b','),
            Err(LibraryError::MalformedRecord { line: 2, .. })
        ));
    }

    #[test]
    fn test_hash_prefixed_header_keeps_first_barcode() {
        let csv = "#barcode,gene\nATGAAGACTGTTGCCGTA,bar1\nCCGTAGGATACCATGACA,bar2\n";
        let library = parse_reference(csv.as_bytes(), b',').unwrap();

        assert_eq!(library.len(), 2);
        assert_eq!(library.barcodes()[0].sequence, "ATGAAGACTGTTGCCGTA");
        assert_eq!(library.barcodes()[0].label, "bar1");
    }

    #[test]
    fn test_header_only_is_empty() {
        assert!(matches!(
            parse_reference("barcode,gene\n".as_bytes(), b','),
            Err(LibraryError::Empty)
        ));
    }

    #[test]
    fn test_load_tsv_file() {
        let mut temp = NamedTempFile::with_suffix(".tsv").unwrap();
        writeln!(temp, "barcode\tgene").unwrap();
        writeln!(temp, "ACGTACGT\tg1").unwrap();
        writeln!(temp, "TTTTAAAA\tg2").unwrap();
        temp.flush().unwrap();

        let library = load_reference_file(temp.path()).unwrap();
        assert_eq!(library.len(), 2);
        assert_eq!(library.barcodes()[1].label, "g2");
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_reference_file(Path::new("/nonexistent/barcodes.csv")),
            Err(LibraryError::Io(_))
        ));
    }
}
