//! Result aggregators for the four navigation actions.
//!
//! Each navigation request subscribes to two producers - one backed by
//! the precise cross-reference index, one by heuristic text search - and
//! merges them into a single output stream per the action's policy:
//!
//! - Definition / Hover: precise wins outright; the fallback is consulted
//!   only when the precise producer completes empty, and its results are
//!   badged as imprecise.
//! - References: precise batches are forwarded verbatim as they arrive;
//!   once the precise producer completes, fallback batches extend a
//!   cumulative list, deduplicated by exact location equality, with new
//!   items badged.
//! - Document highlights: precise only; text search has no equivalent for
//!   in-document highlighting.
//!
//! Producers are invoked lazily (the fallback factory is never called
//! when its policy does not require it), streams are pull-based, and
//! dropping the merged stream cancels both subscriptions.

pub mod definition;
pub mod highlights;
pub mod hover;
pub mod references;

pub use definition::merge_definitions;
pub use highlights::merge_document_highlights;
pub use hover::merge_hovers;
pub use references::merge_references;

use std::sync::Arc;

use futures::stream::BoxStream;
use futures::{pin_mut, Stream, StreamExt, TryStreamExt};
use serde_json::json;
use tracing::debug;

use crate::badges::Badged;
use crate::telemetry::{HostCommands, TelemetryEmitter};
use crate::types::{DocumentHighlight, Hover, Location, Position, TextDocument};

/// A boxed, per-request result stream. Items are batches; a failure
/// terminates the stream.
pub type ResultStream<T> = BoxStream<'static, anyhow::Result<T>>;

/// A restartable producer: invoked once per navigation request with the
/// target document and cursor position.
pub type SourceFn<T> = Arc<dyn Fn(&TextDocument, Position) -> ResultStream<T> + Send + Sync>;

/// A restartable references producer; also receives the request context.
pub type ReferencesSourceFn =
    Arc<dyn Fn(&TextDocument, Position, ReferenceContext) -> ResultStream<Vec<Location>> + Send + Sync>;

/// Additional parameters of a references request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceContext {
    pub include_declaration: bool,
}

type Emitter = TelemetryEmitter<Arc<dyn HostCommands>>;

/// Drain `stream` until its first batch with content, skipping empty
/// batches. Errors propagate; exhaustion yields `None`.
pub(crate) async fn first_with_content<S, T, P>(
    stream: S,
    has_content: P,
) -> anyhow::Result<Option<T>>
where
    S: Stream<Item = anyhow::Result<T>>,
    P: Fn(&T) -> bool,
{
    pin_mut!(stream);
    while let Some(batch) = stream.try_next().await? {
        if has_content(&batch) {
            return Ok(Some(batch));
        }
    }
    Ok(None)
}

/// Defer a source invocation so the producer is only subscribed when the
/// merge policy actually pulls from it.
fn subscription<T: 'static>(
    source: &SourceFn<T>,
    document: &TextDocument,
    position: Position,
) -> impl FnOnce() -> ResultStream<T> + Send + 'static {
    let source = Arc::clone(source);
    let document = document.clone();
    move || source(&document, position)
}

/// Fire-and-forget a telemetry event; never blocks the result stream.
/// The streams themselves need no runtime, so when none is available the
/// event is dropped instead of aborting the request.
fn spawn_emit(emitter: &Arc<Emitter>, action: &'static str) {
    let emitter = Arc::clone(emitter);
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                emitter.emit_once(action, json!({})).await;
            });
        }
        Err(_) => debug!("no async runtime, dropping '{}' event", action),
    }
}

/// Report which sources contributed to each emitted location batch.
fn instrument_locations<S>(
    stream: S,
    emitter: Option<Arc<Emitter>>,
    precise_action: &'static str,
    search_action: &'static str,
) -> impl Stream<Item = anyhow::Result<Vec<Badged<Location>>>>
where
    S: Stream<Item = anyhow::Result<Vec<Badged<Location>>>>,
{
    stream.inspect(move |item| {
        let Some(emitter) = &emitter else { return };
        if let Ok(batch) = item {
            if batch.iter().any(|result| !result.is_imprecise()) {
                spawn_emit(emitter, precise_action);
            }
            if batch.iter().any(|result| result.is_imprecise()) {
                spawn_emit(emitter, search_action);
            }
        }
    })
}

/// Go-to-definition over a precise and a fallback location source.
pub struct DefinitionProvider {
    precise: SourceFn<Vec<Location>>,
    fallback: SourceFn<Vec<Location>>,
    host: Option<Arc<dyn HostCommands>>,
}

impl DefinitionProvider {
    pub fn new(precise: SourceFn<Vec<Location>>, fallback: SourceFn<Vec<Location>>) -> Self {
        Self {
            precise,
            fallback,
            host: None,
        }
    }

    /// Deliver instrumentation events through `host`.
    pub fn with_host(mut self, host: Arc<dyn HostCommands>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn provide_definition(
        &self,
        document: &TextDocument,
        position: Position,
    ) -> ResultStream<Vec<Badged<Location>>> {
        let merged = merge_definitions(
            subscription(&self.precise, document, position),
            subscription(&self.fallback, document, position),
        );
        instrument_locations(
            merged,
            emitter(&self.host, document),
            "preciseDefinitions",
            "searchDefinitions",
        )
        .boxed()
    }
}

/// Find-references over a precise and a fallback location source.
pub struct ReferencesProvider {
    precise: ReferencesSourceFn,
    fallback: ReferencesSourceFn,
    host: Option<Arc<dyn HostCommands>>,
}

impl ReferencesProvider {
    pub fn new(precise: ReferencesSourceFn, fallback: ReferencesSourceFn) -> Self {
        Self {
            precise,
            fallback,
            host: None,
        }
    }

    pub fn with_host(mut self, host: Arc<dyn HostCommands>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn provide_references(
        &self,
        document: &TextDocument,
        position: Position,
        context: ReferenceContext,
    ) -> ResultStream<Vec<Badged<Location>>> {
        let precise = {
            let source = Arc::clone(&self.precise);
            let document = document.clone();
            move || source(&document, position, context)
        };
        let fallback = {
            let source = Arc::clone(&self.fallback);
            let document = document.clone();
            move || source(&document, position, context)
        };
        instrument_locations(
            merge_references(precise, fallback),
            emitter(&self.host, document),
            "preciseReferences",
            "searchReferences",
        )
        .boxed()
    }
}

/// Hover documentation over a precise and a fallback hover source.
pub struct HoverProvider {
    precise: SourceFn<Hover>,
    fallback: SourceFn<Hover>,
    host: Option<Arc<dyn HostCommands>>,
}

impl HoverProvider {
    pub fn new(precise: SourceFn<Hover>, fallback: SourceFn<Hover>) -> Self {
        Self {
            precise,
            fallback,
            host: None,
        }
    }

    pub fn with_host(mut self, host: Arc<dyn HostCommands>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn provide_hover(
        &self,
        document: &TextDocument,
        position: Position,
    ) -> ResultStream<Badged<Hover>> {
        let merged = merge_hovers(
            subscription(&self.precise, document, position),
            subscription(&self.fallback, document, position),
        );
        let emitter = emitter(&self.host, document);
        merged
            .inspect(move |item| {
                let Some(emitter) = &emitter else { return };
                if let Ok(hover) = item {
                    let action = if hover.is_imprecise() {
                        "searchHover"
                    } else {
                        "preciseHover"
                    };
                    spawn_emit(emitter, action);
                }
            })
            .boxed()
    }
}

/// In-document symbol highlighting; precise source only.
pub struct DocumentHighlightProvider {
    precise: SourceFn<Vec<DocumentHighlight>>,
    host: Option<Arc<dyn HostCommands>>,
}

impl DocumentHighlightProvider {
    pub fn new(precise: SourceFn<Vec<DocumentHighlight>>) -> Self {
        Self {
            precise,
            host: None,
        }
    }

    pub fn with_host(mut self, host: Arc<dyn HostCommands>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn provide_document_highlights(
        &self,
        document: &TextDocument,
        position: Position,
    ) -> ResultStream<Vec<DocumentHighlight>> {
        let merged = merge_document_highlights(subscription(&self.precise, document, position));
        let emitter = emitter(&self.host, document);
        merged
            .inspect(move |item| {
                let Some(emitter) = &emitter else { return };
                if item.is_ok() {
                    spawn_emit(emitter, "preciseDocumentHighlights");
                }
            })
            .boxed()
    }
}

fn emitter(host: &Option<Arc<dyn HostCommands>>, document: &TextDocument) -> Option<Arc<Emitter>> {
    host.as_ref().map(|host| {
        Arc::new(TelemetryEmitter::new(
            Arc::clone(host),
            document.language_id.clone(),
        ))
    })
}
