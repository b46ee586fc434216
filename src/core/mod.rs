//! Core data types for BarSeq read classification.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`ReferenceLibrary`]: The ordered set of known barcodes and their labels
//! - [`FlankPattern`]: Flanking motifs, barcode length and edit tolerance
//! - [`RunConfig`], [`CountMode`]: Immutable per-run settings
//! - [`BarcodeId`], [`ClassificationOutcome`]: Per-read classification results
//!
//! ## Reserved buckets
//!
//! Reads that cannot be classified are never dropped. They are counted in a
//! reserved bucket:
//!
//! | Mode | Bucket |
//! |------|--------|
//! | Reference | `_other` |
//! | Reference-free | `no_barcode_found` |
//!
//! [`ReferenceLibrary`]: library::ReferenceLibrary
//! [`FlankPattern`]: config::FlankPattern
//! [`RunConfig`]: config::RunConfig
//! [`CountMode`]: config::CountMode
//! [`BarcodeId`]: types::BarcodeId
//! [`ClassificationOutcome`]: types::ClassificationOutcome

pub mod config;
pub mod library;
pub mod types;
