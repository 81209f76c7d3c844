//! Narrowing cross-document highlight candidates to the current document.

use crate::types::{DocumentHighlight, LocationCandidate, TextDocument};

/// Keep only the candidates that belong to `document`, dropping the URI
/// from each. Candidates for the document that carry no range are dropped
/// as well. Input order is preserved (stable filter, not a re-sort).
pub fn filter_locations_for_document_highlights(
    document: &TextDocument,
    locations: &[LocationCandidate],
) -> Vec<DocumentHighlight> {
    locations
        .iter()
        .filter(|location| location.uri == document.uri)
        .filter_map(|location| location.range)
        .map(DocumentHighlight::new)
        .collect()
}
