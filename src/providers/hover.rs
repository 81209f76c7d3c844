//! Hover documentation merge policy.

use futures::{future, stream, Stream, StreamExt};
use tracing::debug;

use crate::badges::Badged;
use crate::types::Hover;

use super::first_with_content;

/// Merge a precise and a fallback hover producer.
///
/// Same single-shot policy as definitions: the first hover from the
/// precise producer wins and the fallback is never subscribed; otherwise
/// the first fallback hover is emitted badged as imprecise. A hover is an
/// atomic payload, so every emitted value counts as content.
pub fn merge_hovers<P, F, PS, FS>(
    precise: P,
    fallback: F,
) -> impl Stream<Item = anyhow::Result<Badged<Hover>>>
where
    P: FnOnce() -> PS + Send + 'static,
    F: FnOnce() -> FS + Send + 'static,
    PS: Stream<Item = anyhow::Result<Hover>> + Send,
    FS: Stream<Item = anyhow::Result<Hover>> + Send,
{
    stream::once(async move {
        if let Some(hover) = first_with_content(precise(), |_: &Hover| true).await? {
            return Ok(Some(Badged::precise(hover)));
        }
        debug!("precise hover exhausted without results, querying text search");
        if let Some(hover) = first_with_content(fallback(), |_: &Hover| true).await? {
            return Ok(Some(Badged::imprecise(hover)));
        }
        Ok(None)
    })
    .filter_map(|result| future::ready(result.transpose()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    fn hovers(
        items: Vec<Hover>,
    ) -> impl FnOnce() -> futures::stream::BoxStream<'static, anyhow::Result<Hover>> + Send {
        move || stream::iter(items.into_iter().map(anyhow::Ok)).boxed()
    }

    #[tokio::test]
    async fn uses_precise_hover_as_source_of_truth() {
        let merged = merge_hovers(
            hovers(vec![Hover::new("test1"), Hover::new("test2")]),
            hovers(vec![Hover::new("test3")]),
        );
        let collected: Vec<_> = merged.map(Result::unwrap).collect().await;
        assert_eq!(collected, vec![Badged::precise(Hover::new("test1"))]);
    }

    #[tokio::test]
    async fn falls_back_to_search_when_precise_results_are_not_found() {
        let merged = merge_hovers(hovers(vec![]), hovers(vec![Hover::new("test3")]));
        let collected: Vec<_> = merged.map(Result::unwrap).collect().await;
        assert_eq!(collected, vec![Badged::imprecise(Hover::new("test3"))]);
    }

    #[tokio::test]
    async fn never_subscribes_fallback_when_precise_has_results() {
        let subscribed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&subscribed);
        let fallback = move || {
            flag.store(true, Ordering::SeqCst);
            stream::iter(vec![anyhow::Ok(Hover::new("never"))])
        };

        let merged = merge_hovers(hovers(vec![Hover::new("docs")]), fallback);
        let collected: Vec<_> = merged.map(Result::unwrap).collect().await;

        assert_eq!(collected, vec![Badged::precise(Hover::new("docs"))]);
        assert!(!subscribed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn completes_empty_when_both_sources_are_empty() {
        let merged = merge_hovers(hovers(vec![]), hovers(vec![]));
        let collected: Vec<_> = merged.collect().await;
        assert!(collected.is_empty());
    }

    #[tokio::test]
    async fn dropping_the_merged_stream_stops_the_producers() {
        let pulls = Arc::new(AtomicUsize::new(0));
        let precise = {
            let pulls = Arc::clone(&pulls);
            move || {
                stream::unfold(0u32, move |n| {
                    let pulls = Arc::clone(&pulls);
                    async move {
                        pulls.fetch_add(1, Ordering::SeqCst);
                        Some((anyhow::Ok(Hover::new(format!("docs {n}"))), n + 1))
                    }
                })
            }
        };

        let mut merged = Box::pin(merge_hovers(precise, hovers(vec![])));
        let first = merged.next().await;
        assert!(first.is_some());
        assert_eq!(pulls.load(Ordering::SeqCst), 1);

        drop(merged);
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        // No further work happens after cancellation.
        assert_eq!(pulls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fallback_failures_terminate_the_stream() {
        let fallback = || stream::iter(vec![Err(anyhow!("search backend down"))]);
        let merged = merge_hovers(hovers(vec![]), fallback);
        let collected: Vec<_> = merged.collect().await;
        assert_eq!(collected.len(), 1);
        assert!(collected[0].is_err());
    }
}
