//! Syntax highlighting of example sources with tree-sitter.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use tree_sitter_highlight::{HighlightConfiguration, HighlightEvent, Highlighter};

use crate::source::SourceKind;

const CAPTURE_NAMES: &[&str] = &[
    "attribute",
    "comment",
    "constant",
    "constant.builtin",
    "constructor",
    "embedded",
    "function",
    "function.builtin",
    "function.method",
    "keyword",
    "number",
    "operator",
    "property",
    "punctuation",
    "punctuation.bracket",
    "punctuation.delimiter",
    "punctuation.special",
    "string",
    "string.special",
    "tag",
    "type",
    "type.builtin",
    "variable",
    "variable.builtin",
    "variable.parameter",
];

fn configuration(
    name: &str,
    language: tree_sitter::Language,
    highlights: &str,
    injections: &str,
    locals: &str,
) -> Option<HighlightConfiguration> {
    match HighlightConfiguration::new(language, name, highlights, injections, locals) {
        Ok(mut config) => {
            config.configure(CAPTURE_NAMES);
            Some(config)
        }
        Err(e) => {
            tracing::warn!("highlighting disabled for {}: {}", name, e);
            None
        }
    }
}

static CONFIGS: Lazy<HashMap<SourceKind, HighlightConfiguration>> = Lazy::new(|| {
    let js_highlights = format!(
        "{}\n{}",
        tree_sitter_javascript::JSX_HIGHLIGHT_QUERY,
        tree_sitter_javascript::HIGHLIGHT_QUERY
    );
    let ts_highlights = format!(
        "{}\n{}",
        tree_sitter_typescript::HIGHLIGHTS_QUERY,
        tree_sitter_javascript::HIGHLIGHT_QUERY
    );
    let tsx_highlights = format!(
        "{}\n{}",
        tree_sitter_javascript::JSX_HIGHLIGHT_QUERY,
        ts_highlights
    );
    let ts_locals = format!(
        "{}\n{}",
        tree_sitter_typescript::LOCALS_QUERY,
        tree_sitter_javascript::LOCALS_QUERY
    );

    let entries = [
        (
            SourceKind::Js,
            configuration(
                "javascript",
                tree_sitter_javascript::LANGUAGE.into(),
                &js_highlights,
                "",
                tree_sitter_javascript::LOCALS_QUERY,
            ),
        ),
        (
            SourceKind::Jsx,
            configuration(
                "jsx",
                tree_sitter_javascript::LANGUAGE.into(),
                &js_highlights,
                "",
                tree_sitter_javascript::LOCALS_QUERY,
            ),
        ),
        (
            SourceKind::Ts,
            configuration(
                "typescript",
                tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
                &ts_highlights,
                "",
                &ts_locals,
            ),
        ),
        (
            SourceKind::Tsx,
            configuration(
                "tsx",
                tree_sitter_typescript::LANGUAGE_TSX.into(),
                &tsx_highlights,
                "",
                &ts_locals,
            ),
        ),
    ];

    entries
        .into_iter()
        .filter_map(|(kind, config)| config.map(|c| (kind, c)))
        .collect()
});

/// Maps tree-sitter captures onto the highlight.js class names example
/// templates are styled for.
fn css_class(capture: &str) -> &'static str {
    match capture {
        "variable.builtin" | "function.builtin" | "type.builtin" | "constant.builtin" => {
            "hljs-built_in"
        }
        "variable.parameter" => "hljs-params",
        "string.special" => "hljs-regexp",
        _ => match capture.split('.').next().unwrap_or(capture) {
            "keyword" => "hljs-keyword",
            "string" => "hljs-string",
            "comment" => "hljs-comment",
            "number" => "hljs-number",
            "function" | "constructor" => "hljs-title",
            "type" => "hljs-type",
            "tag" => "hljs-name",
            "attribute" => "hljs-attr",
            "property" => "hljs-property",
            "constant" => "hljs-literal",
            "operator" => "hljs-operator",
            "punctuation" => "hljs-punctuation",
            "embedded" => "hljs-subst",
            _ => "hljs-variable",
        },
    }
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Renders `code` as HTML with `<span class="hljs-*">` markup.
///
/// Falls back to escaped plain text when the grammar is unavailable or the
/// source cannot be parsed.
pub fn highlight(kind: SourceKind, code: &str) -> String {
    let Some(config) = CONFIGS.get(&kind) else {
        return escape_html(code);
    };

    let mut highlighter = Highlighter::new();
    let events = match highlighter.highlight(config, code.as_bytes(), None, |_| None) {
        Ok(events) => events,
        Err(e) => {
            tracing::debug!("failed to highlight source: {}", e);
            return escape_html(code);
        }
    };

    let mut html = String::with_capacity(code.len() * 2);
    for event in events {
        match event {
            Ok(HighlightEvent::Source { start, end }) => html.push_str(&escape_html(&code[start..end])),
            Ok(HighlightEvent::HighlightStart(h)) => {
                html.push_str("<span class=\"");
                html.push_str(css_class(CAPTURE_NAMES[h.0]));
                html.push_str("\">");
            }
            Ok(HighlightEvent::HighlightEnd) => html.push_str("</span>"),
            Err(e) => {
                tracing::debug!("failed to highlight source: {}", e);
                return escape_html(code);
            }
        }
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a & b>"), "&lt;a &amp; b&gt;");
    }

    #[test]
    fn test_css_class_mapping() {
        assert_eq!(css_class("keyword"), "hljs-keyword");
        assert_eq!(css_class("function.method"), "hljs-title");
        assert_eq!(css_class("variable.builtin"), "hljs-built_in");
        assert_eq!(css_class("punctuation.bracket"), "hljs-punctuation");
    }

    #[test]
    fn test_highlighted_output_keeps_source_text() {
        let code = "const answer = <Button label=\"x\" />; // done";
        let html = highlight(SourceKind::Jsx, code);

        assert!(!html.contains("<Button"));
        assert!(html.contains("&lt;"));
        assert!(html.contains("answer"));
        assert!(html.contains("// done"));
    }
}
