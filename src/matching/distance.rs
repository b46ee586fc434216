//! Bounded edit distance helpers.
//!
//! Distances are plain Levenshtein distances (unit cost substitution,
//! insertion and deletion) computed with `bio`.

use bio::alignment::distance::levenshtein;

/// Edit distance between `a` and `b` if it is at most `max_edits`.
///
/// Pairs whose lengths differ by more than `max_edits` are rejected without
/// running the dynamic program.
#[must_use]
pub fn bounded_distance(a: &[u8], b: &[u8], max_edits: u8) -> Option<u32> {
    let max = u32::from(max_edits);
    if a.len().abs_diff(b.len()) > usize::from(max_edits) {
        return None;
    }
    let distance = levenshtein(a, b);
    (distance <= max).then_some(distance)
}

/// Smallest edit distance between `motif` and any prefix of `text`, if it is
/// at most `max_edits`.
///
/// This is the anchored form of a fuzzy motif match: the motif must start at
/// `text[0]` but may consume between `len - max_edits` and `len + max_edits`
/// characters of `text`.
#[must_use]
pub fn anchored_prefix_distance(motif: &[u8], text: &[u8], max_edits: u8) -> Option<u32> {
    let max = usize::from(max_edits);
    let shortest = motif.len().saturating_sub(max);
    if text.len() < shortest {
        return None;
    }
    let longest = (motif.len() + max).min(text.len());

    (shortest..=longest)
        .filter_map(|k| bounded_distance(motif, &text[..k], max_edits))
        .min()
}
