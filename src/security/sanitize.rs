//! Free-text input sanitization.
//!
//! # Responsibilities
//! - Strip HTML tags from untrusted text fields
//! - Escape the five HTML-significant characters to entity form
//!
//! # Design Decisions
//! - Tags are removed BEFORE escaping; the reverse order would escape
//!   the angle brackets and let the tag text survive removal
//! - `&` is escaped first so it does not re-escape entities produced
//!   by the later replacements
//! - NOT idempotent on already-sanitized text: running it twice
//!   re-escapes the `&` inside entities (`&lt;` becomes `&amp;lt;`).
//!   Preserved deliberately; callers sanitize exactly once at the edge.

use regex::Regex;
use std::sync::OnceLock;

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"))
}

/// Sanitize untrusted free text for storage and later display.
///
/// Empty input yields an empty string, never an error.
pub fn sanitize(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let stripped = tag_pattern().replace_all(input, "");
    stripped
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
