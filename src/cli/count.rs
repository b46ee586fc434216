use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::OutputFormat;
use crate::core::config::{
    CountMode, FlankPattern, RunConfig, DEFAULT_BARCODE_LENGTH, DEFAULT_LEFT_FLANK,
    DEFAULT_MAX_EDITS, DEFAULT_MIN_COUNT, DEFAULT_RIGHT_FLANK,
};
use crate::core::library::ReferenceLibrary;
use crate::counting::aggregate::{aggregate, RowSource};
use crate::counting::pipeline::count_samples;
use crate::counting::stats::{rank_candidates, RankedCandidates, SampleSummary};
use crate::output::tables::{output_stem, write_outputs, OutputFiles};
use crate::parsing::reference::load_reference_file;
use crate::parsing::samples::{resolve_samples, SampleSheet};

#[derive(Args)]
pub struct CountArgs {
    /// Directory holding one read file (FASTQ/FASTA, optionally .gz) per sample
    #[arg(short, long = "input-dir", required = true)]
    pub input_dir: PathBuf,

    /// Reference barcode table (CSV or TSV: barcode, gene/strain label)
    #[arg(short, long)]
    pub barcodes: Option<PathBuf>,

    /// Experiment name, used in output file names
    #[arg(short, long, required = true)]
    pub experiment: String,

    /// Directory the result tables are written to
    #[arg(short, long, default_value = "results")]
    pub output_dir: PathBuf,

    /// Sample sheet (CSV: file, sample); required with --reference-free
    #[arg(long)]
    pub samples: Option<PathBuf>,

    /// Count extracted barcodes without a reference table
    #[arg(long)]
    pub reference_free: bool,

    /// Minimum reads for a reference-free candidate to be reported
    #[arg(long, default_value_t = DEFAULT_MIN_COUNT, value_parser = clap::value_parser!(u64).range(1..))]
    pub min_count: u64,

    /// Motif immediately upstream of the barcode
    #[arg(long, default_value = DEFAULT_LEFT_FLANK)]
    pub left_flank: String,

    /// Motif immediately downstream of the barcode
    #[arg(long, default_value = DEFAULT_RIGHT_FLANK)]
    pub right_flank: String,

    /// Barcode length in bases
    #[arg(long, default_value_t = DEFAULT_BARCODE_LENGTH)]
    pub barcode_length: usize,

    /// Edits tolerated per flank and per barcode comparison
    #[arg(long, default_value_t = DEFAULT_MAX_EDITS)]
    pub max_edits: u8,

    /// Worker threads (0 = one per core)
    #[arg(short, long, default_value = "0")]
    pub threads: usize,
}

/// Summary of one run, printed to stdout
#[derive(Serialize)]
struct RunReport<'a> {
    experiment: &'a str,
    mode: CountMode,
    counts_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    candidates_file: Option<String>,
    summary_file: String,
    samples: &'a [SampleSummary],
}

/// Execute count subcommand
///
/// # Errors
///
/// Returns an error if the configuration is invalid, an input cannot be read,
/// or the result tables cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CountArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let experiment = args.experiment.trim();
    if experiment.is_empty() {
        bail!("Experiment name must not be empty");
    }

    let config = build_config(&args)?;

    // Every input is checked before any sample is processed
    let library = match config.mode {
        CountMode::Reference => Some(load_library(&args, &config)?),
        CountMode::ReferenceFree { .. } => {
            if args.barcodes.is_some() {
                warn!("--barcodes is ignored with --reference-free");
            }
            None
        }
    };

    let sheet = match &args.samples {
        Some(path) => Some(
            SampleSheet::load(path)
                .with_context(|| format!("Failed to load sample sheet {}", path.display()))?,
        ),
        None if config.mode.is_reference_free() => {
            bail!("--samples is required with --reference-free")
        }
        None => None,
    };

    let samples = resolve_samples(&args.input_dir, sheet.as_ref())?;
    info!("Found {} samples in {}", samples.len(), args.input_dir.display());
    if verbose {
        for input in &samples {
            eprintln!("  {} <- {}", input.sample, input.path.display());
        }
    }

    let tables = count_samples(&samples, &config, library.as_ref(), args.threads)?;

    let (source, ranked) = match (config.mode, library.as_ref()) {
        (CountMode::ReferenceFree { min_count }, _) => {
            let ranked: Vec<RankedCandidates> = tables
                .iter()
                .filter_map(|table| match rank_candidates(table, min_count) {
                    Ok(ranked) => Some(ranked),
                    Err(e) => {
                        warn!("Skipping candidate statistics: {e}");
                        None
                    }
                })
                .collect();
            (RowSource::ReferenceFree { min_count }, Some(ranked))
        }
        (CountMode::Reference, Some(library)) => (RowSource::Reference(library), None),
        (CountMode::Reference, None) => bail!("Reference mode requires --barcodes"),
    };

    let summaries: Vec<SampleSummary> = tables
        .iter()
        .map(|table| {
            let sample_ranked = ranked
                .as_ref()
                .and_then(|r| r.iter().find(|c| c.sample == table.sample()));
            SampleSummary::new(table, sample_ranked)
        })
        .collect();

    for summary in &summaries {
        if summary.low_confidence == Some(true) {
            warn!(
                "{}: top candidate accounts for only {:.2}% of classified reads",
                summary.sample,
                summary.top_candidate_share.unwrap_or_default()
            );
        }
    }

    let table = aggregate(&tables, source);
    let stem = output_stem(experiment, chrono::Local::now().date_naive());
    let files = write_outputs(
        &args.output_dir,
        &stem,
        &table,
        ranked.as_deref(),
        &summaries,
    )?;

    let report = RunReport {
        experiment,
        mode: config.mode,
        counts_file: files.counts.display().to_string(),
        candidates_file: files.candidates.as_ref().map(|p| p.display().to_string()),
        summary_file: files.summary.display().to_string(),
        samples: &summaries,
    };

    match format {
        OutputFormat::Text => print_text_report(&report, &files),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Tsv => print_tsv_report(&summaries),
    }

    Ok(())
}

fn build_config(args: &CountArgs) -> anyhow::Result<RunConfig> {
    let pattern = FlankPattern::new(
        &args.left_flank,
        &args.right_flank,
        args.barcode_length,
        args.max_edits,
    )
    .context("Invalid flank configuration")?;

    let mode = if args.reference_free {
        CountMode::ReferenceFree {
            min_count: args.min_count,
        }
    } else {
        CountMode::Reference
    };

    Ok(RunConfig::new(pattern, mode))
}

fn load_library(args: &CountArgs, config: &RunConfig) -> anyhow::Result<ReferenceLibrary> {
    let Some(path) = &args.barcodes else {
        bail!("--barcodes is required unless --reference-free is given");
    };

    let library = load_reference_file(path)
        .with_context(|| format!("Failed to load reference table {}", path.display()))?;
    info!("Loaded {} reference barcodes from {}", library.len(), path.display());

    let expected = config.pattern.barcode_length();
    let mismatched = library.mismatched_lengths(expected);
    if !mismatched.is_empty() {
        warn!(
            "{} reference barcodes are not {expected} bases long and cannot match exactly (e.g. {})",
            mismatched.len(),
            mismatched[0].sequence
        );
    }

    Ok(library)
}

fn format_rate(rate: Option<f64>) -> String {
    rate.map_or_else(|| "NA".to_string(), |r| format!("{r:.2}%"))
}

fn print_text_report(report: &RunReport<'_>, files: &OutputFiles) {
    println!("Experiment: {}", report.experiment);
    println!();

    for s in report.samples {
        println!(
            "{}: {} reads, {} matched ({}), {} unmatched ({})",
            s.sample,
            s.total_reads,
            s.matched,
            format_rate(s.match_rate),
            s.unmatched,
            format_rate(s.unmatched_rate),
        );
        if let Some(share) = s.top_candidate_share {
            let flag = if s.low_confidence == Some(true) {
                " [low confidence]"
            } else {
                ""
            };
            println!("   Top candidate: {share:.2}% of classified reads{flag}");
        }
    }

    println!();
    println!("Counts:     {}", files.counts.display());
    if let Some(candidates) = &files.candidates {
        println!("Candidates: {}", candidates.display());
    }
    println!("Summary:    {}", files.summary.display());
}

fn print_tsv_report(summaries: &[SampleSummary]) {
    println!("sample\ttotal_reads\tmatched\tunmatched\tmatch_rate\tunmatched_rate\ttop_candidate_share\tlow_confidence");
    for s in summaries {
        let optional = |v: Option<f64>| v.map_or_else(|| "NA".to_string(), |r| format!("{r:.2}"));
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            s.sample,
            s.total_reads,
            s.matched,
            s.unmatched,
            optional(s.match_rate),
            optional(s.unmatched_rate),
            optional(s.top_candidate_share),
            s.low_confidence.map(|b| b.to_string()).unwrap_or_default(),
        );
    }
}
