//! # barseq
//!
//! A library for counting barcode abundance in BarSeq experiments.
//!
//! In a BarSeq screen every strain carries a short DNA barcode embedded
//! between two constant flanking motifs. Sequencing the pooled population
//! yields millions of reads per sample; the abundance of each barcode tracks
//! the fitness of the strain that carries it.
//!
//! `barseq` finds the flanking motifs in each read (tolerating a few
//! sequencing errors), extracts the barcode between them and counts it,
//! either against a table of known barcodes or, without one, as-is.
//!
//! ## Features
//!
//! - **Fuzzy flank matching**: bit-parallel approximate search for the left
//!   motif, anchored check of the right motif
//! - **Reference mode**: assign barcodes to known genes/strains within an
//!   edit tolerance, with an `_other` bucket for everything else
//! - **Reference-free mode**: discover barcodes, filter by minimum count and
//!   rank them per sample
//! - **Parallel samples**: one worker per sample on a rayon pool
//!
//! ## Example
//!
//! ```rust
//! use barseq::core::config::RunConfig;
//! use barseq::core::library::ReferenceLibrary;
//! use barseq::counting::pipeline::{count_reads, Classifier};
//!
//! let library = ReferenceLibrary::from_records(vec![
//!     (2, "ATGAAGACTGTTGCCGTA", "bar1"),
//!     (3, "CCGTAGGATACCATGACA", "bar2"),
//! ])
//! .unwrap();
//!
//! let config = RunConfig::default();
//! let classifier = Classifier::new(&config, Some(&library)).unwrap();
//!
//! let reads = ["GCTCATGCACTTGATTCCATGAAGACTGTTGCCGTAGACTTGACCTGGATGTCT"];
//! let table = count_reads("sample1", reads, &classifier);
//!
//! assert_eq!(table.count("ATGAAGACTGTTGCCGTA"), 1);
//! assert_eq!(table.matched(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Reference library, run configuration and outcome types
//! - [`matching`]: Flank extraction and barcode resolution
//! - [`counting`]: Per-sample counting, statistics and aggregation
//! - [`parsing`]: Readers for reference tables, read files and sample sheets
//! - [`output`]: CSV writers for the result tables
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod counting;
pub mod matching;
pub mod output;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use crate::core::config::{CountMode, FlankPattern, RunConfig};
pub use crate::core::library::ReferenceLibrary;
pub use crate::core::types::*;
pub use crate::counting::aggregate::{aggregate, AggregatedTable};
pub use crate::counting::counter::{SampleCountTable, SampleCounter};
pub use crate::counting::pipeline::{count_samples, Classifier};
