use serde::Serialize;
use thiserror::Error;

use crate::core::config::LOW_CONFIDENCE_THRESHOLD;
use crate::counting::counter::SampleCountTable;
use crate::utils::validation::{count_to_f64, round2};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StatsError {
    #[error("Cannot compute percentages for sample '{sample}': no classified reads")]
    DivisionByZero { sample: String },
}

/// `count / total * 100`, rounded to two decimals; `None` when `total` is zero
#[must_use]
pub fn percentage(count: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(round2(count_to_f64(count) / count_to_f64(total) * 100.0))
}

/// A discovered region with its share of the sample's classified reads
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateStat {
    pub sequence: String,
    pub count: u64,
    pub percentage: f64,
}

/// Filtered and ranked reference-free candidates for one sample
#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidates {
    pub sample: String,
    pub total_classified: u64,
    pub candidates: Vec<CandidateStat>,
}

impl RankedCandidates {
    /// Percentage of classified reads carried by the top candidate
    pub fn top_share(&self) -> f64 {
        self.candidates.first().map_or(0.0, |c| c.percentage)
    }

    /// Whether the dominant candidate is too weak to trust the sample
    pub fn is_low_confidence(&self) -> bool {
        self.top_share() < LOW_CONFIDENCE_THRESHOLD
    }
}

/// Drop candidates seen fewer than `min_count` times and rank the rest.
///
/// Ranking is by count descending, then sequence ascending. Percentages are
/// relative to `total_classified`, which must exclude unmatched reads.
///
/// # Errors
///
/// Returns `StatsError::DivisionByZero` when `total_classified` is zero.
pub fn summarize<'a, I>(
    sample: &str,
    counts: I,
    total_classified: u64,
    min_count: u64,
) -> Result<RankedCandidates, StatsError>
where
    I: IntoIterator<Item = (&'a str, u64)>,
{
    if total_classified == 0 {
        return Err(StatsError::DivisionByZero {
            sample: sample.to_string(),
        });
    }

    let mut candidates: Vec<CandidateStat> = counts
        .into_iter()
        .filter(|&(_, count)| count >= min_count)
        .map(|(sequence, count)| CandidateStat {
            sequence: sequence.to_string(),
            count,
            percentage: percentage(count, total_classified).unwrap_or_default(),
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.sequence.cmp(&b.sequence))
    });

    Ok(RankedCandidates {
        sample: sample.to_string(),
        total_classified,
        candidates,
    })
}

/// Rank the candidates of a finalized reference-free table
///
/// # Errors
///
/// Returns `StatsError::DivisionByZero` when the sample has no classified reads.
pub fn rank_candidates(
    table: &SampleCountTable,
    min_count: u64,
) -> Result<RankedCandidates, StatsError> {
    summarize(
        table.sample(),
        table
            .classified_rows()
            .iter()
            .map(|row| (row.key.as_str(), row.count)),
        table.matched(),
        min_count,
    )
}

/// Per-sample match statistics, reported for every sample
#[derive(Debug, Clone, Serialize)]
pub struct SampleSummary {
    pub sample: String,
    pub total_reads: u64,
    pub matched: u64,
    pub unmatched: u64,
    pub no_flank: u64,
    pub unknown_barcode: u64,
    /// `None` when the sample had no reads
    pub match_rate: Option<f64>,
    pub unmatched_rate: Option<f64>,
    /// Reference-free only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_candidate_share: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_confidence: Option<bool>,
}

impl SampleSummary {
    pub fn new(table: &SampleCountTable, ranked: Option<&RankedCandidates>) -> Self {
        Self {
            sample: table.sample().to_string(),
            total_reads: table.total_reads(),
            matched: table.matched(),
            unmatched: table.unmatched(),
            no_flank: table.no_flank(),
            unknown_barcode: table.unknown_barcode(),
            match_rate: percentage(table.matched(), table.total_reads()),
            unmatched_rate: percentage(table.unmatched(), table.total_reads()),
            top_candidate_share: ranked.map(RankedCandidates::top_share),
            low_confidence: ranked.map(RankedCandidates::is_low_confidence),
        }
    }
}
