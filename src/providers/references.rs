//! Find-references merge policy.
//!
//! References arrive as incrementally growing batches. Precise batches
//! are authoritative: they are forwarded verbatim and immediately, never
//! re-ordered or delayed behind fallback work. Only after the precise
//! producer completes is the fallback consulted; each of its batches
//! extends a cumulative list that only ever grows.

use futures::stream::BoxStream;
use futures::{stream, Stream, StreamExt};
use tracing::debug;

use crate::badges::Badged;
use crate::types::Location;

enum MergeState<F> {
    /// Nothing pulled yet; the precise producer has not been subscribed.
    Idle {
        fallback: F,
    },
    /// Draining the precise producer, remembering its most recent batch.
    Precise {
        stream: BoxStream<'static, anyhow::Result<Vec<Location>>>,
        fallback: F,
        last_batch: Vec<Location>,
    },
    /// Draining the fallback producer into the cumulative list.
    Fallback {
        stream: BoxStream<'static, anyhow::Result<Vec<Location>>>,
        merged: Vec<Badged<Location>>,
    },
    Done,
}

/// Merge a precise and a fallback references producer.
///
/// While the precise producer runs, every batch it emits is forwarded
/// as-is (unbadged). When it completes, its most recent batch seeds a
/// cumulative list; each fallback batch then appends the locations not
/// already present (by exact location equality), badged as imprecise, and
/// the updated cumulative list is emitted. Successive emissions only ever
/// extend the previous one.
pub fn merge_references<P, F, PS, FS>(
    precise: P,
    fallback: F,
) -> impl Stream<Item = anyhow::Result<Vec<Badged<Location>>>>
where
    P: FnOnce() -> PS + Send + 'static,
    F: FnOnce() -> FS + Send + 'static,
    PS: Stream<Item = anyhow::Result<Vec<Location>>> + Send + 'static,
    FS: Stream<Item = anyhow::Result<Vec<Location>>> + Send + 'static,
{
    let mut precise = Some(precise);
    stream::unfold(MergeState::Idle { fallback }, move |mut state| {
        let mut precise = precise.take();
        async move {
            loop {
                state = match state {
                    MergeState::Idle { fallback } => MergeState::Precise {
                        // Idle is only ever the initial state, so the
                        // factory is still present on this path.
                        stream: match precise.take() {
                            Some(subscribe) => subscribe().boxed(),
                            None => return None,
                        },
                        fallback,
                        last_batch: Vec::new(),
                    },
                    MergeState::Precise {
                        mut stream,
                        fallback,
                        last_batch,
                    } => match stream.next().await {
                        Some(Ok(batch)) => {
                            let forwarded: Vec<Badged<Location>> =
                                batch.iter().cloned().map(Badged::precise).collect();
                            return Some((
                                Ok(forwarded),
                                MergeState::Precise {
                                    stream,
                                    fallback,
                                    last_batch: batch,
                                },
                            ));
                        }
                        Some(Err(err)) => return Some((Err(err), MergeState::Done)),
                        None => {
                            debug!(
                                "precise references complete ({} locations), supplementing \
                                 from text search",
                                last_batch.len()
                            );
                            MergeState::Fallback {
                                stream: fallback().boxed(),
                                merged: last_batch.into_iter().map(Badged::precise).collect(),
                            }
                        }
                    },
                    MergeState::Fallback {
                        mut stream,
                        mut merged,
                    } => match stream.next().await {
                        Some(Ok(batch)) => {
                            for location in batch {
                                let already_included =
                                    merged.iter().any(|existing| existing.value == location);
                                if !already_included {
                                    merged.push(Badged::imprecise(location));
                                }
                            }
                            return Some((
                                Ok(merged.clone()),
                                MergeState::Fallback { stream, merged },
                            ));
                        }
                        Some(Err(err)) => return Some((Err(err), MergeState::Done)),
                        None => return None,
                    },
                    MergeState::Done => return None,
                };
            }
        }
    })
}
