//! Centralized validation and helper functions.

/// Maximum motif length supported by the bit-parallel flank search (one `u64` word)
pub const MAX_MOTIF_LENGTH: usize = 64;

/// Whether a byte is one of the four unambiguous nucleotides (uppercase).
#[inline]
#[must_use]
pub fn is_nucleotide(base: u8) -> bool {
    matches!(base, b'A' | b'C' | b'G' | b'T')
}

/// Validate that a sequence only contains `A`, `C`, `G` or `T`.
///
/// # Examples
///
/// ```
/// use barseq::utils::validation::is_valid_dna;
///
/// assert!(is_valid_dna(b"ATGAAGACTG"));
/// assert!(!is_valid_dna(b"ATGNNGACTG"));
/// assert!(!is_valid_dna(b""));
/// ```
#[must_use]
pub fn is_valid_dna(seq: &[u8]) -> bool {
    !seq.is_empty() && seq.iter().copied().all(is_nucleotide)
}

/// Uppercase a sequence and strip surrounding whitespace.
#[must_use]
pub fn normalize_sequence(seq: &str) -> String {
    seq.trim().to_ascii_uppercase()
}

/// Convert a count to f64 for percentage calculations
#[inline]
#[must_use]
pub fn count_to_f64(count: u64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Round a value to two decimal places
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
