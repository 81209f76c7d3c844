//! In-document highlight merge policy.

use futures::{future, stream, Stream, StreamExt};

use crate::types::DocumentHighlight;

use super::first_with_content;

/// Forward the first non-empty highlight batch from the precise producer.
///
/// There is no text-search equivalent for in-document highlighting, so no
/// fallback producer exists for this action.
pub fn merge_document_highlights<P, PS>(
    precise: P,
) -> impl Stream<Item = anyhow::Result<Vec<DocumentHighlight>>>
where
    P: FnOnce() -> PS + Send + 'static,
    PS: Stream<Item = anyhow::Result<Vec<DocumentHighlight>>> + Send,
{
    stream::once(async move {
        first_with_content(precise(), |b: &Vec<DocumentHighlight>| !b.is_empty()).await
    })
    .filter_map(|result| future::ready(result.transpose()))
}
