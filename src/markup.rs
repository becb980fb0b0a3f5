//! Markdown escaping and docstring normalization.
//!
//! Underscores are meaningful both in Python names and in Markdown, so they
//! are escaped everywhere except inside inline code spans, which are treated
//! as opaque. All escaping here is idempotent: an already-escaped character
//! is left alone.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static CODE_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`]*`").unwrap());
static LEADING_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\t ]*").unwrap());
static UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\?_").unwrap());
static MARKUP_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\?[_*]").unwrap());

/// The Markdown hard line break.
pub const HARD_BREAK: &str = "  \n";

fn escape_with(pattern: &Regex, text: &str) -> String {
    pattern
        .replace_all(text, |caps: &Captures<'_>| {
            let m = &caps[0];

            if m.starts_with('\\') {
                m.to_owned()
            } else {
                format!("\\{}", m)
            }
        })
        .into_owned()
}

/// Escapes underscores in a definition or module name.
pub fn escape_name(name: &str) -> String {
    escape_with(&UNDERSCORE, name)
}

/// Escapes underscores and asterisks in a signature fragment.
pub fn escape_signature(fragment: &str) -> String {
    escape_with(&MARKUP_CHAR, fragment)
}

fn escape_outside_code_spans(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut scanned_to = 0;

    for span in CODE_SPAN.find_iter(text) {
        out.push_str(&escape_with(&UNDERSCORE, &text[scanned_to..span.start()]));
        out.push_str(span.as_str());
        scanned_to = span.end();
    }

    out.push_str(&escape_with(&UNDERSCORE, &text[scanned_to..]));

    out
}

fn strip_leading_chars(line: &str, n: usize) -> &str {
    match line.char_indices().nth(n) {
        Some((idx, _)) => &line[idx..],
        None => "",
    }
}

/// Normalizes a docstring's content for Markdown output.
///
/// The pipeline: strip the line breaks adjoining the quotes, dedent every
/// line by the leading whitespace run of the first line, escape underscores
/// outside inline code spans, and join lines with a hard line break.
pub fn normalize_docstring(content: &str) -> String {
    let content = content.trim_matches(|c| c == '\r' || c == '\n');

    let indent = LEADING_WS
        .find(content)
        .map(|m| m.as_str().chars().count())
        .unwrap_or(0);

    let dedented = content
        .split('\n')
        .map(|line| strip_leading_chars(line, indent).trim_end())
        .collect::<Vec<_>>()
        .join("\n");

    escape_outside_code_spans(&dedented).replace('\n', HARD_BREAK)
}
