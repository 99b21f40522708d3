#![forbid(unsafe_code)]

//! Display-width helpers for fixed-width rows.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Appended when a row is cut.
pub const ELLIPSIS: &str = "…";

/// Terminal display width of `s`.
#[must_use]
pub fn display_width(s: &str) -> usize {
    s.width()
}

/// Cut `s` to at most `max_width` columns, ending in [`ELLIPSIS`] when cut.
///
/// Cuts on grapheme boundaries, so combining marks and emoji sequences stay
/// whole; a wide grapheme that would straddle the limit is dropped.
#[must_use]
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let budget = max_width - 1;
    let mut out = String::with_capacity(s.len().min(max_width * 4));
    let mut used = 0;
    for grapheme in s.graphemes(true) {
        let w = grapheme.width();
        if used + w > budget {
            break;
        }
        out.push_str(grapheme);
        used += w;
    }
    out.push_str(ELLIPSIS);
    out
}

/// Collapse line breaks and tabs so content fits one row.
#[must_use]
pub fn single_line(s: &str) -> String {
    s.split(['\n', '\r', '\t'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
