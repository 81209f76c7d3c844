//! Helpers for results coming from the precise cross-reference index.

pub mod highlights;

pub use highlights::filter_locations_for_document_highlights;
