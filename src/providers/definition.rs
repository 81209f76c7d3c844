//! Go-to-definition merge policy.

use futures::{future, stream, Stream, StreamExt};
use tracing::debug;

use crate::badges::Badged;
use crate::types::Location;

use super::first_with_content;

/// Merge a precise and a fallback definition producer.
///
/// The precise producer is consulted first; its first non-empty batch is
/// the final and only output, and the fallback producer is never
/// subscribed. Only when the precise producer completes without content
/// is the fallback subscribed, and its first non-empty batch emitted with
/// every item badged as imprecise. The merged stream completes empty if
/// both sources do.
pub fn merge_definitions<P, F, PS, FS>(
    precise: P,
    fallback: F,
) -> impl Stream<Item = anyhow::Result<Vec<Badged<Location>>>>
where
    P: FnOnce() -> PS + Send + 'static,
    F: FnOnce() -> FS + Send + 'static,
    PS: Stream<Item = anyhow::Result<Vec<Location>>> + Send,
    FS: Stream<Item = anyhow::Result<Vec<Location>>> + Send,
{
    stream::once(async move {
        if let Some(batch) = first_with_content(precise(), |b: &Vec<Location>| !b.is_empty()).await?
        {
            return Ok(Some(batch.into_iter().map(Badged::precise).collect::<Vec<_>>()));
        }
        debug!("precise definitions exhausted without results, querying text search");
        if let Some(batch) =
            first_with_content(fallback(), |b: &Vec<Location>| !b.is_empty()).await?
        {
            return Ok(Some(
                batch.into_iter().map(Badged::imprecise).collect::<Vec<_>>(),
            ));
        }
        Ok(None)
    })
    .filter_map(|result| future::ready(result.transpose()))
}
