//! Sample discovery and sample sheets.
//!
//! Every read file in the input directory is one sample. Without a sample
//! sheet the identifier is derived from the file name with
//! [`format_sample_name`]; with one, the sheet maps file names to
//! identifiers and only listed files are processed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::parsing::data_records;
use crate::parsing::reads::is_read_file;

#[derive(Error, Debug)]
pub enum SampleError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse sample sheet: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed sample sheet record on line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    #[error("Sample '{sample}' is produced by both {first} and {second}")]
    DuplicateSample {
        sample: String,
        first: String,
        second: String,
    },

    #[error("Sample sheet lists {file}, which is not a read file in {dir}")]
    MissingFile { file: String, dir: PathBuf },

    #[error("No read files found in {0}")]
    NoSamples(PathBuf),
}

/// A sample identifier and the read file holding its reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleInput {
    pub sample: String,
    pub path: PathBuf,
}

/// Turn a file name into a sample identifier.
///
/// Everything from the first `.` is dropped, surrounding whitespace is
/// trimmed, spaces become `_` and every character that is not alphanumeric,
/// `_` or `-` is removed.
///
/// # Examples
///
/// ```
/// use barseq::parsing::samples::format_sample_name;
///
/// assert_eq!(format_sample_name("Sample 01.fastq.gz"), "Sample_01");
/// assert_eq!(format_sample_name("weird:_file-%$name_=']["), "weird_file-name_");
/// ```
#[must_use]
pub fn format_sample_name(name: &str) -> String {
    let stem = name.split('.').next().unwrap_or_default();
    stem.trim()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// File name -> sample identifier rows from a sample sheet
#[derive(Debug, Clone, Default)]
pub struct SampleSheet {
    rows: Vec<(String, String)>,
}

impl SampleSheet {
    /// Load a CSV sample sheet with `file,sample` columns.
    ///
    /// The first line is a header and is always skipped; later `#` lines
    /// are comments.
    ///
    /// # Errors
    ///
    /// Returns `SampleError::Io` if the file cannot be opened,
    /// `SampleError::Csv` on CSV syntax errors, or
    /// `SampleError::MalformedRecord` for rows missing a column.
    pub fn load(path: &Path) -> Result<Self, SampleError> {
        let file = std::fs::File::open(path).map_err(|source| SampleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Parse a sample sheet from any reader
    ///
    /// # Errors
    ///
    /// See [`SampleSheet::load`].
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, SampleError> {
        let mut rows = Vec::new();
        for result in data_records(reader, b',') {
            let record = result?;
            let line = record.position().map_or(0, csv::Position::line);
            let file = record.get(0).unwrap_or_default();
            let sample = record.get(1).unwrap_or_default();
            if file.is_empty() || sample.is_empty() {
                return Err(SampleError::MalformedRecord {
                    line,
                    reason: "expected a file name and a sample identifier".to_string(),
                });
            }
            rows.push((file.to_string(), sample.to_string()));
        }

        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn list_read_files(dir: &Path) -> Result<Vec<PathBuf>, SampleError> {
    let io_err = |source| SampleError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let hidden = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with('.'));
        if !path.is_file() || hidden {
            continue;
        }
        if is_read_file(&path) {
            files.push(path);
        } else {
            debug!("Skipping {}: not a FASTQ/FASTA file", path.display());
        }
    }
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// List the samples to process, sorted by identifier.
///
/// # Errors
///
/// Returns `SampleError::Io` if the directory cannot be listed,
/// `SampleError::MissingFile` if the sheet names a file that is not present,
/// `SampleError::DuplicateSample` if two files map to one identifier, or
/// `SampleError::NoSamples` if nothing is left to process.
pub fn resolve_samples(
    input_dir: &Path,
    sheet: Option<&SampleSheet>,
) -> Result<Vec<SampleInput>, SampleError> {
    let files = list_read_files(input_dir)?;

    let mut samples: Vec<SampleInput> = match sheet {
        None => files
            .into_iter()
            .map(|path| SampleInput {
                sample: format_sample_name(&file_name(&path)),
                path,
            })
            .collect(),
        Some(sheet) => {
            let mut by_name: HashMap<String, PathBuf> =
                files.into_iter().map(|p| (file_name(&p), p)).collect();
            let mut listed = Vec::with_capacity(sheet.len());
            for (file, sample) in &sheet.rows {
                let path = by_name
                    .remove(file)
                    .ok_or_else(|| SampleError::MissingFile {
                        file: file.clone(),
                        dir: input_dir.to_path_buf(),
                    })?;
                listed.push(SampleInput {
                    sample: sample.clone(),
                    path,
                });
            }
            for unlisted in by_name.keys() {
                warn!("{unlisted} is not listed in the sample sheet, skipping");
            }
            listed
        }
    };

    samples.sort_by(|a, b| a.sample.cmp(&b.sample));
    for pair in samples.windows(2) {
        if pair[0].sample == pair[1].sample {
            return Err(SampleError::DuplicateSample {
                sample: pair[0].sample.clone(),
                first: pair[0].path.display().to_string(),
                second: pair[1].path.display().to_string(),
            });
        }
    }

    if samples.is_empty() {
        return Err(SampleError::NoSamples(input_dir.to_path_buf()));
    }

    Ok(samples)
}
