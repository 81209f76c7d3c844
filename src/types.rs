//! Core value types shared across the navigation providers.
//!
//! All values here are created per-request and owned by the request that
//! produced them. Equality is exact: locations compare by URI string and
//! range with no normalization.

use serde::{Deserialize, Serialize};

/// Zero-based cursor coordinate within a document.
///
/// Ordering is lexicographic: line first, then character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A span between two positions, start <= end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start_line: u32, start_character: u32, end_line: u32, end_character: u32) -> Self {
        Self {
            start: Position::new(start_line, start_character),
            end: Position::new(end_line, end_character),
        }
    }
}

/// A range within an identified resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub uri: String,
    pub range: Range,
}

impl Location {
    pub fn new(uri: impl Into<String>, range: Range) -> Self {
        Self {
            uri: uri.into(),
            range,
        }
    }
}

/// A candidate location as delivered by the cross-reference index, where
/// the range may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCandidate {
    pub uri: String,
    pub range: Option<Range>,
}

/// Documentation payload shown on hover. Treated as an atomic value by
/// the aggregation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hover {
    pub contents: String,
}

impl Hover {
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
        }
    }
}

/// A highlighted occurrence within the current document. The resource is
/// implicit (always the requesting document), so there is no URI field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHighlight {
    pub range: Range,
}

impl DocumentHighlight {
    pub fn new(range: Range) -> Self {
        Self { range }
    }
}

/// The document a navigation request targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDocument {
    pub uri: String,
    pub language_id: String,
    /// Full text, if the host supplied it.
    pub text: Option<String>,
}

impl TextDocument {
    pub fn new(uri: impl Into<String>, language_id: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            language_id: language_id.into(),
            text: None,
        }
    }
}

/// The identifier recovered from under a cursor, with its lexical
/// classification. Does not persist beyond a single query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchToken {
    pub text: String,
    pub is_comment: bool,
}
