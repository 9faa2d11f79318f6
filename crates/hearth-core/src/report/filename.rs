//! Suggested download filenames

use std::sync::OnceLock;

use regex::Regex;

use crate::layout::strip_diacritics;

use super::request::DateRange;

fn disallowed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_\-]").expect("valid regex"))
}

fn repeated_underscores() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_{2,}").expect("valid regex"))
}

/// Normalize a title for use in a filename
///
/// Diacritics are stripped, whitespace becomes `_`, and anything outside
/// `[A-Za-z0-9_-]` is removed.
pub fn normalize_title(title: &str) -> String {
    let folded = strip_diacritics(title);
    let underscored: String = folded
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    let cleaned = disallowed().replace_all(&underscored, "");
    let collapsed = repeated_underscores().replace_all(&cleaned, "_");
    let trimmed = collapsed.trim_matches('_');
    if trimmed.is_empty() {
        "report".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `<Title>_<from>_<to>.<extension>`
pub fn suggested_filename(title: &str, range: &DateRange, extension: &str) -> String {
    format!(
        "{}_{}_{}.{}",
        normalize_title(title),
        range.from.format("%Y-%m-%d"),
        range.to.format("%Y-%m-%d"),
        extension
    )
}
