// Codenav - Hybrid Code Navigation Library
//!
//! Codenav merges two independent result sources per navigation request:
//! a precise source backed by a pre-computed cross-reference index and a
//! fallback source backed by heuristic text search. Fallback results are
//! marked with a provenance badge so callers can tell them apart.

pub mod badges;
pub mod languages;
pub mod precise;
pub mod providers;
pub mod search;
pub mod telemetry;
pub mod types;

// Re-export common types
pub use badges::{Badge, Badged, IMPRECISE_BADGE};
pub use providers::{
    DefinitionProvider, DocumentHighlightProvider, HoverProvider, ReferenceContext,
    ReferencesProvider,
};
pub use types::{
    DocumentHighlight, Hover, Location, LocationCandidate, Position, Range, SearchToken,
    TextDocument,
};
