use crate::core::library::ReferenceLibrary;
use crate::core::types::{BarcodeId, ClassificationOutcome};
use crate::matching::distance::bounded_distance;

/// Resolve a region against the library.
///
/// Barcodes are tried in load order and the first one within `max_edits`
/// wins, even when a later barcode is closer. This mirrors the behavior
/// existing BarSeq count tables were produced with.
pub fn resolve(
    candidate: &[u8],
    library: &ReferenceLibrary,
    max_edits: u8,
) -> ClassificationOutcome {
    if max_edits == 0 {
        return std::str::from_utf8(candidate)
            .ok()
            .and_then(|seq| library.find(seq))
            .map_or(
                ClassificationOutcome::UnmatchedUnknownBarcode,
                ClassificationOutcome::Matched,
            );
    }

    library
        .barcodes()
        .iter()
        .position(|entry| {
            bounded_distance(candidate, entry.sequence.as_bytes(), max_edits).is_some()
        })
        .map_or(ClassificationOutcome::UnmatchedUnknownBarcode, |i| {
            ClassificationOutcome::Matched(BarcodeId(i))
        })
}

/// Reference-free resolution: the region itself is the counting key.
pub fn resolve_free(candidate: &[u8]) -> ClassificationOutcome {
    ClassificationOutcome::CandidateFound(String::from_utf8_lossy(candidate).into_owned())
}

/// Resolution strategy, chosen once per run
#[derive(Debug, Clone, Copy)]
pub enum BarcodeResolver<'a> {
    Reference {
        library: &'a ReferenceLibrary,
        max_edits: u8,
    },
    ReferenceFree,
}

impl BarcodeResolver<'_> {
    /// Classify an extracted region, or the absence of one
    pub fn classify(&self, candidate: Option<&[u8]>) -> ClassificationOutcome {
        match (self, candidate) {
            (Self::Reference { library, max_edits }, Some(region)) => {
                resolve(region, library, *max_edits)
            }
            (Self::Reference { .. }, None) => ClassificationOutcome::UnmatchedNoFlank,
            (Self::ReferenceFree, Some(region)) => resolve_free(region),
            (Self::ReferenceFree, None) => ClassificationOutcome::NoFlankMatch,
        }
    }
}
