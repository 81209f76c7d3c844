//! Per-language lexical configuration.
//!
//! Data only: each language maps to its recognized file extensions, the
//! matching patterns consumed by the token extractor, and a comment-style
//! descriptor consumed by the docstring extractor. Behavior is entirely
//! driven by these patterns; a pattern that fails to compile degrades the
//! affected feature (with a warning) rather than failing the request.

use regex::Regex;
use tracing::warn;

use crate::search::TokenConfig;

/// Where a docstring sits relative to the definition it documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocPlacement {
    AboveDefinition,
    BelowDefinition,
}

/// Block-comment patterns for docstring extraction.
#[derive(Debug, Clone, Copy)]
pub struct BlockCommentStyle {
    pub start_regex: &'static str,
    pub content_regex: &'static str,
    pub end_regex: &'static str,
}

/// Comment syntax of a language, as consumed by the docstring extractor.
#[derive(Debug, Clone, Copy)]
pub struct CommentStyle {
    /// Matches a line comment and captures its content.
    pub line_regex: Option<&'static str>,
    pub block: Option<BlockCommentStyle>,
    pub doc_placement: DocPlacement,
}

/// Lexical configuration of one language.
#[derive(Debug, Clone, Copy)]
pub struct LanguageSpec {
    pub language_id: &'static str,
    pub stylized: &'static str,
    pub file_exts: &'static [&'static str],
    /// Character class matching one identifier character, when the
    /// default word-character class is wrong for the language.
    pub ident_char_pattern: Option<&'static str>,
    /// Line-comment start marker used by the token extractor.
    pub line_regex: Option<&'static str>,
    /// printf-style templates (`%s` is the symbol) the text-search
    /// fallback uses to spot definition sites.
    pub definition_patterns: &'static [&'static str],
    /// Lines that look like comments but are annotations; skipped by the
    /// docstring extractor.
    pub docstring_ignore: Option<&'static str>,
    pub comment_style: CommentStyle,
}

const C_STYLE: CommentStyle = CommentStyle {
    line_regex: Some(r"//\s*(.*)"),
    block: Some(BlockCommentStyle {
        start_regex: r"/\*\*?",
        content_regex: r"^\s*\*?\s*(.*)",
        end_regex: r"\*/",
    }),
    doc_placement: DocPlacement::AboveDefinition,
};

const SHELL_STYLE: CommentStyle = CommentStyle {
    line_regex: Some(r"#\s*(.*)"),
    block: None,
    doc_placement: DocPlacement::AboveDefinition,
};

const PYTHON_STYLE: CommentStyle = CommentStyle {
    line_regex: Some(r"#\s*(.*)"),
    block: Some(BlockCommentStyle {
        start_regex: r#"""""#,
        content_regex: r"^\s*(.*)",
        end_regex: r#"""""#,
    }),
    doc_placement: DocPlacement::BelowDefinition,
};

const LISP_STYLE: CommentStyle = CommentStyle {
    line_regex: None,
    block: Some(BlockCommentStyle {
        start_regex: r#"""#,
        content_regex: r"^\s*(.*)",
        end_regex: r#"""#,
    }),
    doc_placement: DocPlacement::BelowDefinition,
};

const DEFAULT_SPEC: LanguageSpec = LanguageSpec {
    language_id: "",
    stylized: "",
    file_exts: &[],
    ident_char_pattern: None,
    line_regex: None,
    definition_patterns: &[],
    docstring_ignore: None,
    comment_style: CommentStyle {
        line_regex: None,
        block: None,
        doc_placement: DocPlacement::AboveDefinition,
    },
};

/// All supported languages.
pub static LANGUAGES: &[LanguageSpec] = &[
    LanguageSpec {
        language_id: "java",
        stylized: "Java",
        file_exts: &["java"],
        line_regex: Some(r"//"),
        docstring_ignore: Some(r"^\s*@"),
        comment_style: C_STYLE,
        ..DEFAULT_SPEC
    },
    LanguageSpec {
        language_id: "cpp",
        stylized: "C++",
        file_exts: &["c", "cc", "cpp", "hh", "h"],
        line_regex: Some(r"//"),
        comment_style: C_STYLE,
        ..DEFAULT_SPEC
    },
    LanguageSpec {
        language_id: "ruby",
        stylized: "Ruby",
        file_exts: &[
            "rb", "builder", "eye", "fcgi", "gemspec", "god", "jbuilder", "mspec", "pluginspec",
            "podspec", "rabl", "rake", "rbuild", "rbw", "rbx", "ru", "ruby", "spec", "thor",
            "watchr",
        ],
        line_regex: Some(r"#"),
        comment_style: SHELL_STYLE,
        ..DEFAULT_SPEC
    },
    LanguageSpec {
        language_id: "php",
        stylized: "PHP",
        file_exts: &["php", "phtml", "php3", "php4", "php5", "php6", "php7", "phps"],
        line_regex: Some(r"//"),
        comment_style: C_STYLE,
        ..DEFAULT_SPEC
    },
    LanguageSpec {
        language_id: "csharp",
        stylized: "C#",
        file_exts: &["cs", "csx"],
        line_regex: Some(r"//"),
        comment_style: CommentStyle {
            line_regex: Some(r"///?\s*(.*)"),
            ..C_STYLE
        },
        ..DEFAULT_SPEC
    },
    LanguageSpec {
        language_id: "shell",
        stylized: "Shell",
        file_exts: &["sh", "bash", "zsh"],
        line_regex: Some(r"#"),
        comment_style: SHELL_STYLE,
        ..DEFAULT_SPEC
    },
    LanguageSpec {
        language_id: "scala",
        stylized: "Scala",
        file_exts: &["sbt", "sc", "scala"],
        line_regex: Some(r"//"),
        definition_patterns: &[r"\b(def|val|var|class|object|trait)\s%s\b"],
        comment_style: C_STYLE,
        ..DEFAULT_SPEC
    },
    LanguageSpec {
        language_id: "swift",
        stylized: "Swift",
        file_exts: &["swift"],
        line_regex: Some(r"//"),
        definition_patterns: &[
            r"\b(func|class|var|let|for|struct|enum|protocol)\s%s\b",
            r"\bfunc\s.*\s%s:",
        ],
        comment_style: C_STYLE,
        ..DEFAULT_SPEC
    },
    LanguageSpec {
        language_id: "rust",
        stylized: "Rust",
        file_exts: &["rs", "rs.in"],
        line_regex: Some(r"//"),
        comment_style: CommentStyle {
            line_regex: Some(r"///?!?\s*(.*)"),
            ..C_STYLE
        },
        ..DEFAULT_SPEC
    },
    LanguageSpec {
        language_id: "kotlin",
        stylized: "Kotlin",
        file_exts: &["kt", "ktm", "kts"],
        line_regex: Some(r"//"),
        definition_patterns: &[
            r"\b(fun|val|var|class|interface)\s%s\b",
            r"\bfun\s.*\s%s:",
            r"\bfor\s\(%s\sin",
        ],
        comment_style: C_STYLE,
        ..DEFAULT_SPEC
    },
    LanguageSpec {
        language_id: "elixir",
        stylized: "Elixir",
        file_exts: &["ex", "exs"],
        line_regex: Some(r"#"),
        definition_patterns: &[r"\b(def|defp|defmodule)\s%s\b"],
        docstring_ignore: Some(r"^\s*@"),
        comment_style: CommentStyle {
            doc_placement: DocPlacement::AboveDefinition,
            ..PYTHON_STYLE
        },
        ..DEFAULT_SPEC
    },
    LanguageSpec {
        language_id: "perl",
        stylized: "Perl",
        file_exts: &[
            "pl", "al", "cgi", "fcgi", "perl", "ph", "plx", "pm", "pod", "psgi", "t",
        ],
        line_regex: Some(r"#"),
        comment_style: CommentStyle {
            line_regex: Some(r"#\s*(.*)"),
            block: None,
            doc_placement: DocPlacement::AboveDefinition,
        },
        ..DEFAULT_SPEC
    },
    LanguageSpec {
        language_id: "lua",
        stylized: "Lua",
        file_exts: &["lua", "fcgi", "nse", "pd_lua", "rbxs", "wlua"],
        line_regex: Some(r"--"),
        comment_style: CommentStyle {
            line_regex: Some(r"---?\s+(.*)"),
            block: Some(BlockCommentStyle {
                start_regex: r"--\[\[",
                content_regex: r"^\s*(.*)",
                end_regex: r"\]\]",
            }),
            doc_placement: DocPlacement::AboveDefinition,
        },
        ..DEFAULT_SPEC
    },
    LanguageSpec {
        language_id: "clojure",
        stylized: "Clojure",
        file_exts: &["clj", "cljs", "cljx"],
        ident_char_pattern: Some(r"[A-Za-z0-9_\-!?]"),
        line_regex: Some(r";"),
        comment_style: LISP_STYLE,
        ..DEFAULT_SPEC
    },
    LanguageSpec {
        language_id: "haskell",
        stylized: "Haskell",
        file_exts: &["hs", "hsc"],
        line_regex: Some(r"--"),
        definition_patterns: &[
            r"\b%s\s::",
            r"^data\s%s\b",
            r"^newtype\s%s\b",
            r"^type\s%s\b",
            r"^class.*\b%s\b",
        ],
        docstring_ignore: Some(r"INLINE|^#"),
        comment_style: CommentStyle {
            line_regex: Some(r"--[\s|]*(.*)"),
            block: Some(BlockCommentStyle {
                start_regex: r"\{-",
                content_regex: r"^\s*(.*)",
                end_regex: r"-\}",
            }),
            doc_placement: DocPlacement::AboveDefinition,
        },
        ..DEFAULT_SPEC
    },
    LanguageSpec {
        language_id: "powershell",
        stylized: "PowerShell",
        file_exts: &["ps1", "psd1", "psm1"],
        line_regex: Some(r"#"),
        definition_patterns: &[r"^function\s%s\b"],
        docstring_ignore: Some(r"\{"),
        comment_style: CommentStyle {
            line_regex: None,
            block: Some(BlockCommentStyle {
                start_regex: r"<#",
                content_regex: r"^\s*(.*)",
                end_regex: r"#>",
            }),
            doc_placement: DocPlacement::BelowDefinition,
        },
        ..DEFAULT_SPEC
    },
    LanguageSpec {
        language_id: "lisp",
        stylized: "Lisp",
        file_exts: &["lisp", "asd", "cl", "lsp", "l", "ny", "podsl", "sexp", "el"],
        ident_char_pattern: Some(r"[A-Za-z0-9_\-!?]"),
        line_regex: Some(r";"),
        comment_style: LISP_STYLE,
        ..DEFAULT_SPEC
    },
    LanguageSpec {
        language_id: "erlang",
        stylized: "Erlang",
        file_exts: &["erl"],
        line_regex: Some(r"%%"),
        docstring_ignore: Some(r"-spec"),
        comment_style: CommentStyle {
            line_regex: Some(r"%%\s*(.*)"),
            block: None,
            doc_placement: DocPlacement::AboveDefinition,
        },
        ..DEFAULT_SPEC
    },
    LanguageSpec {
        language_id: "dart",
        stylized: "Dart",
        file_exts: &["dart"],
        line_regex: Some(r"//"),
        definition_patterns: &[r"^(abstract\s)?class\s%s\b"],
        comment_style: CommentStyle {
            line_regex: Some(r"///\s*(.*)"),
            block: None,
            doc_placement: DocPlacement::AboveDefinition,
        },
        ..DEFAULT_SPEC
    },
    LanguageSpec {
        language_id: "ocaml",
        stylized: "OCaml",
        file_exts: &["ml", "eliom", "eliomi", "ml4", "mli", "mll", "mly", "re"],
        comment_style: CommentStyle {
            line_regex: None,
            block: Some(BlockCommentStyle {
                start_regex: r"\(\*\*?",
                content_regex: r"^\s*\*?\s*(.*)",
                end_regex: r"\*\)",
            }),
            doc_placement: DocPlacement::AboveDefinition,
        },
        ..DEFAULT_SPEC
    },
    LanguageSpec {
        language_id: "r",
        stylized: "R",
        file_exts: &["r", "R", "rd", "rsx"],
        line_regex: Some(r"#"),
        comment_style: CommentStyle {
            line_regex: Some(r"#'?\s*(.*)"),
            block: None,
            doc_placement: DocPlacement::AboveDefinition,
        },
        ..DEFAULT_SPEC
    },
];

/// Look up a language by its identifier.
pub fn language_by_id(language_id: &str) -> Option<&'static LanguageSpec> {
    LANGUAGES.iter().find(|spec| spec.language_id == language_id)
}

/// Look up a language by file extension. Extensions claimed by more than
/// one language (e.g. `fcgi`) resolve to the first entry in table order.
pub fn language_for_extension(extension: &str) -> Option<&'static LanguageSpec> {
    LANGUAGES
        .iter()
        .find(|spec| spec.file_exts.contains(&extension))
}

impl LanguageSpec {
    /// Build the token-extraction configuration for this language. A
    /// pattern that fails to compile disables the feature it drives.
    pub fn token_config(&self) -> TokenConfig {
        TokenConfig {
            ident_char_pattern: self
                .ident_char_pattern
                .and_then(|pattern| compile(pattern, self.language_id, "ident_char_pattern")),
            line_regex: self
                .line_regex
                .and_then(|pattern| compile(pattern, self.language_id, "line_regex")),
        }
    }
}

fn compile(pattern: &str, language_id: &str, what: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(err) => {
            warn!("invalid {} for language {}: {}", what, language_id, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::find_search_token;
    use crate::types::{Position, SearchToken};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct LogSink(Arc<Mutex<Vec<u8>>>);

    impl LogSink {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for LogSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogSink {
        type Writer = LogSink;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn every_language_resolves_by_id() {
        for spec in LANGUAGES {
            assert_eq!(
                language_by_id(spec.language_id).map(|s| s.language_id),
                Some(spec.language_id)
            );
        }
    }

    #[test]
    fn extension_lookup() {
        assert_eq!(language_for_extension("rs").map(|s| s.language_id), Some("rust"));
        assert_eq!(
            language_for_extension("clj").map(|s| s.language_id),
            Some("clojure")
        );
        assert_eq!(language_for_extension("erl").map(|s| s.language_id), Some("erlang"));
        assert!(language_for_extension("unknown").is_none());
    }

    #[test]
    fn shared_extensions_resolve_in_table_order() {
        // `fcgi` belongs to ruby, perl, and lua; ruby comes first.
        assert_eq!(language_for_extension("fcgi").map(|s| s.language_id), Some("ruby"));
    }

    #[test]
    fn all_embedded_patterns_compile() {
        for spec in LANGUAGES {
            let config = spec.token_config();
            assert_eq!(config.ident_char_pattern.is_some(), spec.ident_char_pattern.is_some());
            assert_eq!(config.line_regex.is_some(), spec.line_regex.is_some());

            for pattern in [
                spec.docstring_ignore,
                spec.comment_style.line_regex,
                spec.comment_style.block.map(|b| b.start_regex),
                spec.comment_style.block.map(|b| b.content_regex),
                spec.comment_style.block.map(|b| b.end_regex),
            ]
            .into_iter()
            .flatten()
            {
                assert!(Regex::new(pattern).is_ok(), "pattern {pattern:?} must compile");
            }
        }
    }

    #[test]
    fn invalid_patterns_degrade_with_a_warning() {
        let sink = LogSink::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(sink.clone())
            .with_ansi(false)
            .finish();

        let broken = LanguageSpec {
            language_id: "broken",
            ident_char_pattern: Some("["),
            line_regex: Some("//"),
            ..DEFAULT_SPEC
        };
        let config = tracing::subscriber::with_default(subscriber, || broken.token_config());

        // The bad pattern disables its feature; the good one survives.
        assert!(config.ident_char_pattern.is_none());
        assert!(config.line_regex.is_some());
        assert!(sink
            .contents()
            .contains("invalid ident_char_pattern for language broken"));
    }

    #[test]
    fn clojure_tokens_include_dashes_and_bangs() {
        let config = language_by_id("clojure").unwrap().token_config();
        assert_eq!(
            find_search_token("(defn skip-ws! []", Position::new(0, 6), &config),
            Some(SearchToken {
                text: "skip-ws!".to_string(),
                is_comment: false,
            })
        );
    }

    #[test]
    fn rust_line_comments_are_detected() {
        let config = language_by_id("rust").unwrap().token_config();
        assert_eq!(
            find_search_token("foo // bar baz", Position::new(0, 8), &config),
            Some(SearchToken {
                text: "bar".to_string(),
                is_comment: true,
            })
        );
    }
}
