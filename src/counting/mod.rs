//! Counting, statistics and aggregation of classified reads.
//!
//! - [`SampleCounter`]: Per-sample accumulator, owned by one worker
//! - [`SampleCountTable`]: Finalized, read-only per-sample counts
//! - [`summarize`]: Reference-free candidate ranking and filtering
//! - [`aggregate`]: Merge per-sample tables into one multi-sample table
//! - [`count_samples`]: Parallel per-sample processing
//!
//! ## Invariants
//!
//! - Every read recorded in a counter lands in exactly one bucket, so
//!   `matched + unmatched == total_reads` for every sample
//! - Counts only ever grow while a sample is processed
//! - Only finalized tables can be aggregated; an aborted sample never
//!   produces a table
//!
//! ## Statistics
//!
//! Percentages are `count / total_classified * 100` rounded to two decimals,
//! where `total_classified` excludes the reserved unmatched bucket. A
//! sample with no classified reads has no percentages.
//!
//! [`SampleCounter`]: counter::SampleCounter
//! [`SampleCountTable`]: counter::SampleCountTable
//! [`summarize`]: stats::summarize
//! [`aggregate`]: aggregate::aggregate
//! [`count_samples`]: pipeline::count_samples

pub mod aggregate;
pub mod counter;
pub mod pipeline;
pub mod stats;
