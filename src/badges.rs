//! Provenance badges for navigation results.
//!
//! Results sourced from the text-search fallback carry a badge so that
//! callers (and users) can tell low-confidence results from precise ones.
//! Attaching a badge wraps the value; the original is never mutated.

use serde::Serialize;

/// A marker denoting that a result came from the imprecise fallback source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub kind: &'static str,
    pub hover_message: &'static str,
}

/// The badge attached to all search-based results.
pub const IMPRECISE_BADGE: Badge = Badge {
    kind: "info",
    hover_message: "Search-based result (precise result not available)",
};

/// A navigation result with optional provenance marker.
///
/// Precise results carry no badge; fallback results carry
/// [`IMPRECISE_BADGE`]. Re-badging overwrites the marker with the same
/// value, so the operation is idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badged<T> {
    pub value: T,
    pub badge: Option<Badge>,
}

impl<T> Badged<T> {
    /// Wrap a result from the precise source (no badge).
    pub fn precise(value: T) -> Self {
        Self { value, badge: None }
    }

    /// Wrap a result from the fallback source with the imprecise badge.
    pub fn imprecise(value: T) -> Self {
        Self {
            value,
            badge: Some(IMPRECISE_BADGE),
        }
    }

    pub fn is_imprecise(&self) -> bool {
        self.badge.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Location, Range};

    #[test]
    fn badging_does_not_touch_the_value() {
        let loc = Location::new("file:///a.rs", Range::new(1, 2, 3, 4));
        let badged = Badged::imprecise(loc.clone());
        assert_eq!(badged.value, loc);
        assert_eq!(badged.badge, Some(IMPRECISE_BADGE));
    }

    #[test]
    fn rebadging_is_idempotent() {
        let badged = Badged::imprecise(42);
        let again = Badged::imprecise(badged.value);
        assert_eq!(badged, again);
    }

    #[test]
    fn precise_results_carry_no_badge() {
        assert!(!Badged::precise(1).is_imprecise());
        assert!(Badged::imprecise(1).is_imprecise());
    }
}
