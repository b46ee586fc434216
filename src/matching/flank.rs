use bio::pattern_matching::myers::Myers;

use crate::core::config::FlankPattern;
use crate::matching::distance::anchored_prefix_distance;
use crate::utils::validation::is_nucleotide;

/// One way of laying the pattern over a read
#[derive(Debug, Clone, Copy)]
struct Placement {
    /// Inclusive end of the left motif match; the region starts right after
    left_end: usize,
    left_edits: u8,
    right_edits: u32,
}

impl Placement {
    fn rank(&self) -> (u32, u8, usize) {
        (
            u32::from(self.left_edits) + self.right_edits,
            self.left_edits,
            self.left_end,
        )
    }
}

/// Extracts the variable region between two flanking motifs.
///
/// The search looks for `[left (<= e edits)][barcode_length x ACGT][right (<= e edits)]`
/// anywhere in the read. The left motif is located with Myers' bit-parallel
/// algorithm; the region must follow it directly and the right motif must be
/// anchored right after the region.
///
/// Only the leftmost occurrence is considered. Within that occurrence (left
/// motif ends at most `2e` apart) the placement with the fewest total edits
/// wins, then the one with fewer left-motif edits, then the earliest.
pub struct FlankMatcher {
    pattern: FlankPattern,
    left: Myers<u64>,
}

impl FlankMatcher {
    pub fn new(pattern: &FlankPattern) -> Self {
        Self {
            pattern: pattern.clone(),
            left: Myers::<u64>::new(pattern.left().as_bytes()),
        }
    }

    pub fn pattern(&self) -> &FlankPattern {
        &self.pattern
    }

    /// Extract the region from an uppercase read, or `None` if the pattern
    /// does not occur.
    pub fn extract<'r>(&self, read: &'r [u8]) -> Option<&'r [u8]> {
        if read.len() < self.pattern.min_read_length() {
            return None;
        }

        let max_edits = self.pattern.max_edits();
        let window = 2 * usize::from(max_edits);
        let length = self.pattern.barcode_length();
        let right = self.pattern.right().as_bytes();

        let mut first_end: Option<usize> = None;
        let mut best: Option<Placement> = None;

        for (left_end, left_edits) in self.left.find_all_end(read, max_edits) {
            if first_end.is_some_and(|first| left_end > first + window) {
                break;
            }

            let start = left_end + 1;
            let stop = start + length;
            if stop > read.len() {
                break;
            }
            if !read[start..stop].iter().copied().all(is_nucleotide) {
                continue;
            }
            let Some(right_edits) = anchored_prefix_distance(right, &read[stop..], max_edits)
            else {
                continue;
            };

            let placement = Placement {
                left_end,
                left_edits,
                right_edits,
            };
            first_end.get_or_insert(left_end);
            if best.map_or(true, |b| placement.rank() < b.rank()) {
                best = Some(placement);
            }
        }

        best.map(|p| &read[p.left_end + 1..p.left_end + 1 + length])
    }
}
