//! Token extraction under a cursor position.
//!
//! Recovers the identifier a cursor points at from raw line text and
//! classifies it as code or comment prose. Classification is driven by
//! per-language matching configuration: a character class for identifier
//! characters and an optional line-comment start pattern. Absence of a
//! token is a normal "no result" outcome, never an error.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::types::{Position, SearchToken};

/// Matching configuration for token extraction. All fields are optional;
/// defaults are word characters and no comment detection.
#[derive(Debug, Clone, Default)]
pub struct TokenConfig {
    /// Matches a single character that can be part of an identifier.
    pub ident_char_pattern: Option<Regex>,
    /// Marks the start of a line comment. When absent, every token is
    /// classified as code.
    pub line_regex: Option<Regex>,
}

/// A matching pattern supplied for token extraction was invalid.
#[derive(Debug, Error)]
#[error("invalid {what} pattern: {source}")]
pub struct PatternError {
    what: &'static str,
    #[source]
    source: regex::Error,
}

impl TokenConfig {
    /// Compile a configuration from raw pattern strings.
    pub fn from_patterns(
        ident_char_pattern: Option<&str>,
        line_regex: Option<&str>,
    ) -> Result<Self, PatternError> {
        let compile = |pattern: &str, what: &'static str| {
            Regex::new(pattern).map_err(|source| PatternError { what, source })
        };
        Ok(Self {
            ident_char_pattern: ident_char_pattern
                .map(|p| compile(p, "ident_char_pattern"))
                .transpose()?,
            line_regex: line_regex.map(|p| compile(p, "line_regex")).transpose()?,
        })
    }
}

fn default_ident_char_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[A-Za-z0-9_]").expect("static pattern compiles"))
}

/// Find the maximal identifier-character run covering or adjacent to
/// `position`, and decide whether it sits inside a line comment.
///
/// A token nominally inside a comment is still reported as code when it
/// looks like an embedded reference: a call (`foo(`), a field projection
/// (`.foo`), or a quoted identifier that is not the entire trailing
/// comment text. These heuristics are tuned empirically; their literal
/// behavior is pinned by the tests below.
pub fn find_search_token(
    text: &str,
    position: Position,
    config: &TokenConfig,
) -> Option<SearchToken> {
    let line = text.split('\n').nth(position.line as usize)?;
    let cells: Vec<(usize, char)> = line.char_indices().collect();
    let cursor = position.character as usize;
    if cells.is_empty() || cursor > cells.len() {
        return None;
    }

    let ident = config
        .ident_char_pattern
        .as_ref()
        .unwrap_or_else(|| default_ident_char_pattern());
    let is_ident = |c: char| {
        let mut buf = [0u8; 4];
        ident.is_match(c.encode_utf8(&mut buf))
    };

    // Expand right, then left, from the cursor.
    let mut end = cells.len();
    for (i, &(_, c)) in cells.iter().enumerate().skip(cursor) {
        if !is_ident(c) {
            end = i;
            break;
        }
    }
    let mut start = 0;
    for i in (0..=cursor.min(cells.len() - 1)).rev() {
        if !is_ident(cells[i].1) {
            start = i + 1;
            break;
        }
    }
    if start >= end {
        return None;
    }
    let token: String = cells[start..end].iter().map(|&(_, c)| c).collect();

    let Some(line_regex) = &config.line_regex else {
        return Some(SearchToken {
            text: token,
            is_comment: false,
        });
    };
    let comment = match line_regex.find(line) {
        // The comment must start at or before the token for the token to
        // lie inside it.
        Some(m) if m.start() <= cells[start].0 => m,
        _ => {
            return Some(SearchToken {
                text: token,
                is_comment: false,
            })
        }
    };

    // Comments frequently embed identifiers the user is pointing at on
    // purpose; a few lexical shapes are still treated as code.
    let looks_like_call = cells.get(end).map(|&(_, c)| c) == Some('(');
    let looks_like_projection = start > 0 && cells[start - 1].1 == '.';
    if looks_like_call || looks_like_projection {
        return Some(SearchToken {
            text: token,
            is_comment: false,
        });
    }

    let is_comment = match quoted_span(&cells, start, end) {
        // A quoted identifier reads as a reference, unless the quotes
        // span the entire trailing comment content (then it is prose).
        Some(quoted) => line[comment.end()..].trim() == quoted,
        None => true,
    };
    Some(SearchToken {
        text: token,
        is_comment,
    })
}

/// The `"..."` span enclosing the token, if any.
fn quoted_span(cells: &[(usize, char)], start: usize, end: usize) -> Option<String> {
    let open = cells[..start].iter().rposition(|&(_, c)| c == '"')?;
    let close = end + cells[end..].iter().position(|&(_, c)| c == '"')?;
    Some(cells[open..=close].iter().map(|&(_, c)| c).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(ident: Option<&str>, line: Option<&str>) -> TokenConfig {
        TokenConfig::from_patterns(ident, line).unwrap()
    }

    fn token(text: &str, is_comment: bool) -> Option<SearchToken> {
        Some(SearchToken {
            text: text.to_string(),
            is_comment,
        })
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        let err = TokenConfig::from_patterns(Some("["), None).unwrap_err();
        assert!(err.to_string().contains("ident_char_pattern"));
        assert!(TokenConfig::from_patterns(None, Some("(")).is_err());
    }

    #[test]
    fn custom_ident_char_pattern() {
        assert_eq!(
            find_search_token(
                "(defn skip-ws! []",
                Position::new(0, 6),
                &config(Some(r"[A-Za-z0-9_\-!?]"), None),
            ),
            token("skip-ws!", false)
        );
    }

    #[test]
    fn identifies_comments_after_the_token() {
        assert_eq!(
            find_search_token("foo bar // baz", Position::new(0, 5), &config(None, Some("//"))),
            token("bar", false)
        );
    }

    #[test]
    fn identifies_comments_before_the_token() {
        assert_eq!(
            find_search_token("foo // bar baz", Position::new(0, 8), &config(None, Some("//"))),
            token("bar", true)
        );
    }

    #[test]
    fn special_cases_comment_content_that_looks_like_a_function_call() {
        assert_eq!(
            find_search_token("foo // bar(baz)", Position::new(0, 8), &config(None, Some("//"))),
            token("bar", false)
        );
    }

    #[test]
    fn special_cases_comment_content_that_looks_like_a_field_projection() {
        assert_eq!(
            find_search_token("foo // .bar baz", Position::new(0, 9), &config(None, Some("//"))),
            token("bar", false)
        );
    }

    #[test]
    fn special_cases_comment_content_that_looks_like_a_string() {
        assert_eq!(
            find_search_token(
                "foo // \"bar\" baz",
                Position::new(0, 9),
                &config(None, Some("//")),
            ),
            token("bar", false)
        );
    }

    #[test]
    fn special_cases_comment_content_that_looks_exactly_like_a_string() {
        assert_eq!(
            find_search_token(
                "foo // \"bar baz\"",
                Position::new(0, 9),
                &config(None, Some("//")),
            ),
            token("bar", true)
        );
    }

    #[test]
    fn no_line_regex_means_no_comment_detection() {
        assert_eq!(
            find_search_token("foo // bar baz", Position::new(0, 8), &config(None, None)),
            token("bar", false)
        );
    }

    #[test]
    fn token_abutting_the_comment_delimiter() {
        // Token starts exactly where the delimiter match ends.
        assert_eq!(
            find_search_token("ab //bar", Position::new(0, 6), &config(None, Some("//"))),
            token("bar", true)
        );
    }

    #[test]
    fn cursor_at_line_start() {
        assert_eq!(
            find_search_token("foo bar", Position::new(0, 0), &config(None, None)),
            token("foo", false)
        );
    }

    #[test]
    fn cursor_just_past_the_token() {
        assert_eq!(
            find_search_token("foo", Position::new(0, 3), &config(None, None)),
            token("foo", false)
        );
    }

    #[test]
    fn cursor_on_non_identifier_character() {
        assert_eq!(
            find_search_token("foo (bar)", Position::new(0, 4), &config(None, None)),
            None
        );
    }

    #[test]
    fn cursor_selects_its_own_line() {
        assert_eq!(
            find_search_token("foo\nbar\nbaz", Position::new(1, 1), &config(None, None)),
            token("bar", false)
        );
    }

    #[test]
    fn missing_line_yields_no_token() {
        assert_eq!(
            find_search_token("foo", Position::new(3, 0), &config(None, None)),
            None
        );
        assert_eq!(
            find_search_token("", Position::new(0, 0), &config(None, None)),
            None
        );
    }

    #[test]
    fn cursor_beyond_line_end_yields_no_token() {
        assert_eq!(
            find_search_token("foo", Position::new(0, 10), &config(None, None)),
            None
        );
    }
}
