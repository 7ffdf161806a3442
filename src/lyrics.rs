//! Couplet pagination over plain lyrics text.
//!
//! Couplets are separated by a blank line, i.e. two consecutive `\n`. The
//! separator is consumed; line breaks inside a couplet are kept as-is.

pub const COUPLET_SEPARATOR: &str = "\n\n";

/// Split lyrics into couplets, in order.
///
/// Empty text yields a single empty couplet, so the result is never empty.
pub fn couplets(text: &str) -> Vec<&str> {
    text.split(COUPLET_SEPARATOR).collect()
}

/// Get the zero-based `index`-th couplet, or `None` if the song has fewer couplets.
pub fn couplet(text: &str, index: usize) -> Option<&str> {
    text.split(COUPLET_SEPARATOR).nth(index)
}
