use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::validation::{is_valid_dna, normalize_sequence, MAX_MOTIF_LENGTH};

/// Left flank used by the standard BarSeq construct
pub const DEFAULT_LEFT_FLANK: &str = "GCTCATGCACTTGATTCC";

/// Right flank used by the standard BarSeq construct
pub const DEFAULT_RIGHT_FLANK: &str = "GACTTGACCTGGATGTCT";

/// Default length of the variable barcode region
pub const DEFAULT_BARCODE_LENGTH: usize = 18;

/// Default per-motif edit tolerance
pub const DEFAULT_MAX_EDITS: u8 = 1;

/// Default minimum occurrences for a reference-free candidate to be reported
pub const DEFAULT_MIN_COUNT: u64 = 1;

/// Top-candidate share (percent) below which a reference-free sample is flagged
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 75.0;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{side} flank is empty")]
    EmptyMotif { side: &'static str },

    #[error("{side} flank '{motif}' contains characters other than A, C, G, T")]
    InvalidMotif { side: &'static str, motif: String },

    #[error("{side} flank is {length} bases long, maximum supported is {MAX_MOTIF_LENGTH}")]
    MotifTooLong { side: &'static str, length: usize },

    #[error("Barcode length must be greater than zero")]
    ZeroBarcodeLength,

    #[error("Edit tolerance {max_edits} must be smaller than the {side} flank length ({length})")]
    ToleranceTooLarge {
        side: &'static str,
        max_edits: u8,
        length: usize,
    },
}

/// Flanking motifs and the captured region between them.
///
/// Immutable once constructed; motifs are stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlankPattern {
    left: String,
    right: String,
    barcode_length: usize,
    max_edits: u8,
}

impl FlankPattern {
    /// Build and validate a pattern.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if either motif is empty, contains non-ACGT
    /// characters or is too long, if the barcode length is zero, or if the
    /// tolerance would allow a motif to be edited away entirely.
    pub fn new(
        left: &str,
        right: &str,
        barcode_length: usize,
        max_edits: u8,
    ) -> Result<Self, ConfigError> {
        let left = validate_motif("Left", left, max_edits)?;
        let right = validate_motif("Right", right, max_edits)?;
        if barcode_length == 0 {
            return Err(ConfigError::ZeroBarcodeLength);
        }

        Ok(Self {
            left,
            right,
            barcode_length,
            max_edits,
        })
    }

    pub fn left(&self) -> &str {
        &self.left
    }

    pub fn right(&self) -> &str {
        &self.right
    }

    pub fn barcode_length(&self) -> usize {
        self.barcode_length
    }

    pub fn max_edits(&self) -> u8 {
        self.max_edits
    }

    /// Shortest read that can possibly contain the full pattern
    pub fn min_read_length(&self) -> usize {
        self.left.len() + self.barcode_length + self.right.len()
    }
}

impl Default for FlankPattern {
    fn default() -> Self {
        Self {
            left: DEFAULT_LEFT_FLANK.to_string(),
            right: DEFAULT_RIGHT_FLANK.to_string(),
            barcode_length: DEFAULT_BARCODE_LENGTH,
            max_edits: DEFAULT_MAX_EDITS,
        }
    }
}

fn validate_motif(side: &'static str, motif: &str, max_edits: u8) -> Result<String, ConfigError> {
    let motif = normalize_sequence(motif);
    if motif.is_empty() {
        return Err(ConfigError::EmptyMotif { side });
    }
    if !is_valid_dna(motif.as_bytes()) {
        return Err(ConfigError::InvalidMotif { side, motif });
    }
    if motif.len() > MAX_MOTIF_LENGTH {
        return Err(ConfigError::MotifTooLong {
            side,
            length: motif.len(),
        });
    }
    if usize::from(max_edits) >= motif.len() {
        return Err(ConfigError::ToleranceTooLarge {
            side,
            max_edits,
            length: motif.len(),
        });
    }
    Ok(motif)
}

/// How extracted regions are turned into counting keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum CountMode {
    /// Resolve regions against a reference library
    Reference,
    /// Count raw regions and keep those seen at least `min_count` times
    ReferenceFree { min_count: u64 },
}

impl CountMode {
    pub fn is_reference_free(self) -> bool {
        matches!(self, Self::ReferenceFree { .. })
    }
}

/// Settings for a whole run, built once and shared read-only
#[derive(Debug, Clone, Serialize)]
pub struct RunConfig {
    pub pattern: FlankPattern,
    pub mode: CountMode,
}

impl RunConfig {
    pub fn new(pattern: FlankPattern, mode: CountMode) -> Self {
        Self { pattern, mode }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            pattern: FlankPattern::default(),
            mode: CountMode::Reference,
        }
    }
}
