//! Command-line interface for barseq.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **count**: Count barcodes in every read file of a directory
//!
//! ## Usage
//!
//! ```text
//! # Count known barcodes
//! barseq count -i reads/ -b barcodes.csv -e experiment1
//!
//! # Discover barcodes without a reference
//! barseq count -i reads/ --reference-free --samples samples.csv --min-count 5 -e screen
//!
//! # JSON summary for scripting
//! barseq count -i reads/ -b barcodes.csv -e experiment1 --format json
//! ```

use clap::{Parser, Subcommand};

pub mod count;

#[derive(Parser)]
#[command(name = "barseq")]
#[command(version)]
#[command(about = "Count barcode abundance in BarSeq experiments")]
#[command(
    long_about = "barseq extracts the barcode between two flanking sequences in every read and counts how often each barcode occurs per sample.\n\nWith a reference table, barcodes are assigned to known genes/strains with an edit tolerance. Without one (--reference-free), extracted barcodes are counted as-is and ranked per sample."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format for the run summary printed to stdout
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Count barcodes in every read file of a directory
    Count(count::CountArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
