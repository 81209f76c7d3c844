//! Heuristic text-search support for the fallback source.

pub mod tokens;

pub use tokens::{find_search_token, PatternError, TokenConfig};
