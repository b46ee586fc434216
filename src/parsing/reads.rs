//! Read stream decoding using noodles.
//!
//! Yields the raw nucleotide sequence of every record in a FASTQ or FASTA
//! file. Supports both uncompressed and gzip/bgzip compressed files.
//!
//! Supported extensions:
//! - `.fastq`, `.fq` (FASTQ)
//! - `.fasta`, `.fa`, `.fna` (FASTA)
//! - any of the above followed by `.gz` or `.bgz`

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::{fasta, fastq};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Unsupported read file format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadFormat {
    Fastq,
    Fasta,
}

/// Detect the record format and compression of a read file from its name
///
/// # Errors
///
/// Returns `ReadError::UnsupportedFormat` for unknown extensions.
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
pub fn detect_format(path: &Path) -> Result<(ReadFormat, bool), ReadError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let (stem, gzipped) = match name
        .strip_suffix(".gz")
        .or_else(|| name.strip_suffix(".bgz"))
    {
        Some(stem) => (stem, true),
        None => (name.as_str(), false),
    };

    let format = match Path::new(stem).extension().and_then(|e| e.to_str()) {
        Some("fastq" | "fq") => ReadFormat::Fastq,
        Some("fasta" | "fa" | "fna") => ReadFormat::Fasta,
        _ => return Err(ReadError::UnsupportedFormat(path.display().to_string())),
    };

    Ok((format, gzipped))
}

/// Whether a path looks like a read file this module can decode
pub fn is_read_file(path: &Path) -> bool {
    detect_format(path).is_ok()
}

/// Call `f` with the sequence of every record in `path`, in file order.
///
/// Returns the number of records visited.
///
/// # Errors
///
/// Returns `ReadError::Io` if the file cannot be opened or read,
/// `ReadError::Noodles` if a record cannot be parsed, or
/// `ReadError::UnsupportedFormat` for unknown extensions.
pub fn for_each_read<F>(path: &Path, f: F) -> Result<u64, ReadError>
where
    F: FnMut(&[u8]),
{
    let (format, gzipped) = detect_format(path)?;
    let file = File::open(path)?;

    let reader: Box<dyn Read> = if gzipped {
        Box::new(MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };

    for_each_read_in(BufReader::new(reader), format, f)
}

/// Same as [`for_each_read`] over an already opened reader
///
/// # Errors
///
/// Returns `ReadError::Io` or `ReadError::Noodles` on malformed input.
pub fn for_each_read_in<R, F>(reader: R, format: ReadFormat, mut f: F) -> Result<u64, ReadError>
where
    R: BufRead,
    F: FnMut(&[u8]),
{
    let mut visited = 0;

    match format {
        ReadFormat::Fastq => {
            let mut reader = fastq::io::Reader::new(reader);
            for result in reader.records() {
                let record = result
                    .map_err(|e| ReadError::Noodles(format!("Failed to parse FASTQ record: {e}")))?;
                f(record.sequence());
                visited += 1;
            }
        }
        ReadFormat::Fasta => {
            let mut reader = fasta::io::Reader::new(reader);
            for result in reader.records() {
                let record = result
                    .map_err(|e| ReadError::Noodles(format!("Failed to parse FASTA record: {e}")))?;
                f(record.sequence().as_ref());
                visited += 1;
            }
        }
    }

    Ok(visited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_detect_format() {
        let cases = [
            ("sample.fastq", ReadFormat::Fastq, false),
            ("sample.FQ", ReadFormat::Fastq, false),
            ("sample.fastq.gz", ReadFormat::Fastq, true),
            ("sample.fa", ReadFormat::Fasta, false),
            ("sample.fna.bgz", ReadFormat::Fasta, true),
        ];
        for (name, format, gzipped) in cases {
            assert_eq!(
                detect_format(Path::new(name)).unwrap(),
                (format, gzipped),
                "{name}"
            );
        }
        assert!(detect_format(Path::new("sample.bam")).is_err());
        assert!(detect_format(Path::new("notes.txt.gz")).is_err());
        assert!(!is_read_file(Path::new("README")));
    }

    #[test]
    fn test_fastq_records() {
        let fastq = b"@r1\nACGT\n+\nIIII\n@r2\nttgca\n+\nIIIII\n";
        let mut seqs = Vec::new();
        let n = for_each_read_in(&fastq[..], ReadFormat::Fastq, |s| seqs.push(s.to_vec())).unwrap();
        assert_eq!(n, 2);
        assert_eq!(seqs, vec![b"ACGT".to_vec(), b"ttgca".to_vec()]);
    }

    #[test]
    fn test_fasta_records() {
        let fasta = b">r1\nACGT\nACGT\n>r2\nGG\n";
        let mut seqs = Vec::new();
        let n = for_each_read_in(&fasta[..], ReadFormat::Fasta, |s| seqs.push(s.to_vec())).unwrap();
        assert_eq!(n, 2);
        assert_eq!(seqs, vec![b"ACGTACGT".to_vec(), b"GG".to_vec()]);
    }

    #[test]
    fn test_gzipped_fastq_file() {
        let temp = NamedTempFile::with_suffix(".fastq.gz").unwrap();
        {
            let mut encoder = GzEncoder::new(temp.reopen().unwrap(), Compression::default());
            encoder.write_all(b"@r1\nACGT\n+\nIIII\n").unwrap();
            encoder.finish().unwrap();
        }

        let mut count = 0;
        let n = for_each_read(temp.path(), |_| count += 1).unwrap();
        assert_eq!(n, 1);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_malformed_fastq() {
        let fastq = b"@r1\nACGT\n-\nIIII\n";
        let result = for_each_read_in(&fastq[..], ReadFormat::Fastq, |_| {});
        assert!(matches!(result, Err(ReadError::Noodles(_))));
    }
}
