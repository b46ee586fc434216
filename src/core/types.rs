use serde::{Deserialize, Serialize};

/// Label of the reserved "no match" entry in reference mode.
pub const OTHER_LABEL: &str = "_other";

/// Key of the reserved "no match" bucket in reference-free mode.
pub const NO_BARCODE_FOUND: &str = "no_barcode_found";

/// Position of a barcode in the reference library (load order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BarcodeId(pub usize);

impl BarcodeId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for BarcodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of classifying a single read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationOutcome {
    /// Flanks found and the region resolved to a known barcode
    Matched(BarcodeId),
    /// Flanks could not be located in the read
    UnmatchedNoFlank,
    /// Flanks found but the region is not within tolerance of any barcode
    UnmatchedUnknownBarcode,
    /// Reference-free: the captured region itself is the key
    CandidateFound(String),
    /// Reference-free: flanks could not be located in the read
    NoFlankMatch,
}

impl ClassificationOutcome {
    /// Whether the read landed in a real (non-reserved) bucket
    #[must_use]
    pub fn is_classified(&self) -> bool {
        matches!(self, Self::Matched(_) | Self::CandidateFound(_))
    }
}
