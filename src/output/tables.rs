use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use crate::counting::aggregate::AggregatedTable;
use crate::counting::stats::{RankedCandidates, SampleSummary};

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Paths of the files written for one run
#[derive(Debug, Clone)]
pub struct OutputFiles {
    pub counts: PathBuf,
    pub candidates: Option<PathBuf>,
    pub summary: PathBuf,
}

/// `<date>_<experiment>`, the common prefix of every output file
#[must_use]
pub fn output_stem(experiment: &str, date: NaiveDate) -> String {
    format!("{}_{experiment}", date.format("%Y-%m-%d"))
}

fn format_rate(rate: Option<f64>) -> String {
    rate.map_or_else(|| "NA".to_string(), |r| format!("{r:.2}"))
}

/// Write the aggregated count table.
///
/// Reference mode writes `Gene,Barcode,<samples...>`; reference-free mode
/// writes `Sequence,<samples...>`.
///
/// # Errors
///
/// Returns `OutputError::Csv` if a row cannot be written.
pub fn write_count_table<W: Write>(
    writer: W,
    table: &AggregatedTable,
    reference_free: bool,
) -> Result<(), OutputError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = if reference_free {
        vec!["Sequence"]
    } else {
        vec!["Gene", "Barcode"]
    };
    header.extend(table.samples().iter().map(String::as_str));
    csv_writer.write_record(&header)?;

    for row in table.rows() {
        let mut record: Vec<String> = if reference_free {
            vec![row.key.clone()]
        } else {
            vec![row.label.clone(), row.key.clone()]
        };
        record.extend(row.counts.iter().map(u64::to_string));
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write the ranked reference-free candidates of every sample
///
/// # Errors
///
/// Returns `OutputError::Csv` if a row cannot be written.
pub fn write_candidates<W: Write>(
    writer: W,
    ranked: &[RankedCandidates],
) -> Result<(), OutputError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["sample", "sequence", "count", "percentage"])?;

    for sample in ranked {
        for candidate in &sample.candidates {
            let count = candidate.count.to_string();
            let percentage = format!("{:.2}", candidate.percentage);
            csv_writer.write_record([
                sample.sample.as_str(),
                candidate.sequence.as_str(),
                count.as_str(),
                percentage.as_str(),
            ])?;
        }
    }

    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write one summary row per sample
///
/// # Errors
///
/// Returns `OutputError::Csv` if a row cannot be written.
pub fn write_summary<W: Write>(writer: W, summaries: &[SampleSummary]) -> Result<(), OutputError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "sample",
        "total_reads",
        "matched",
        "unmatched",
        "no_flank",
        "unknown_barcode",
        "match_rate",
        "unmatched_rate",
        "top_candidate_share",
        "low_confidence",
    ])?;

    for s in summaries {
        csv_writer.write_record([
            s.sample.clone(),
            s.total_reads.to_string(),
            s.matched.to_string(),
            s.unmatched.to_string(),
            s.no_flank.to_string(),
            s.unknown_barcode.to_string(),
            format_rate(s.match_rate),
            format_rate(s.unmatched_rate),
            format_rate(s.top_candidate_share),
            s.low_confidence.map(|b| b.to_string()).unwrap_or_default(),
        ])?;
    }

    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn create(path: &Path) -> Result<std::io::BufWriter<std::fs::File>, OutputError> {
    std::fs::File::create(path)
        .map(std::io::BufWriter::new)
        .map_err(|source| OutputError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Write all result tables of a run into `out_dir`, creating it if needed.
///
/// `candidates` is only written in reference-free mode.
///
/// # Errors
///
/// Returns `OutputError::Io` if the directory or a file cannot be created,
/// or `OutputError::Csv` if writing fails.
pub fn write_outputs(
    out_dir: &Path,
    stem: &str,
    table: &AggregatedTable,
    candidates: Option<&[RankedCandidates]>,
    summaries: &[SampleSummary],
) -> Result<OutputFiles, OutputError> {
    std::fs::create_dir_all(out_dir).map_err(|source| OutputError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let counts = out_dir.join(format!("{stem}.csv"));
    write_count_table(create(&counts)?, table, candidates.is_some())?;
    info!("Wrote count table to {}", counts.display());

    let candidates = match candidates {
        Some(ranked) => {
            let path = out_dir.join(format!("{stem}_candidates.csv"));
            write_candidates(create(&path)?, ranked)?;
            info!("Wrote candidate table to {}", path.display());
            Some(path)
        }
        None => None,
    };

    let summary = out_dir.join(format!("{stem}_summary.csv"));
    write_summary(create(&summary)?, summaries)?;
    info!("Wrote summary to {}", summary.display());

    Ok(OutputFiles {
        counts,
        candidates,
        summary,
    })
}
