//! Parsers for the inputs of a BarSeq run.
//!
//! This module provides parsers for:
//!
//! - **Reference tables**: CSV/TSV files of `barcode,label` rows
//! - **Read files**: FASTQ/FASTA, optionally gzip compressed
//! - **Sample sheets**: CSV files mapping read files to sample identifiers
//!
//! ## Example
//!
//! ```rust,no_run
//! use barseq::parsing::reference::load_reference_file;
//! use barseq::parsing::samples::resolve_samples;
//! use std::path::Path;
//!
//! let library = load_reference_file(Path::new("barcodes.csv")).unwrap();
//! let samples = resolve_samples(Path::new("reads/"), None).unwrap();
//! println!("{} barcodes, {} samples", library.len(), samples.len());
//! ```
//!
//! ## Reference table format
//!
//! | Column | Description | Required |
//! |--------|-------------|----------|
//! | 1 | Barcode sequence (case-insensitive) | Yes |
//! | 2 | Gene or strain label | Yes |
//!
//! The first line is always the header, even when it starts with `#`.
//! Later lines starting with `#` are comments.

pub mod reads;
pub mod reference;
pub mod samples;

/// Data rows of a delimited table.
///
/// The first physical line is the header and is skipped unconditionally;
/// rows whose first field starts with `#` are comments.
pub(crate) fn data_records<R: std::io::Read>(
    reader: R,
    delimiter: u8,
) -> impl Iterator<Item = csv::Result<csv::StringRecord>> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
        .into_records()
        .skip(1)
        .filter(|result| {
            !matches!(result, Ok(record) if record.get(0).is_some_and(|f| f.starts_with('#')))
        })
}
