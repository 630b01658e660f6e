//! Footnote-marker stripping.
//!
//! Text layers flatten superscript footnote references into ordinary digits
//! glued to the preceding word: `society5`, `freedom”12`. Both patterns are
//! removed with a whole-line pass each; the preceding letter or quote is
//! kept. A number that follows whitespace is left alone.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

// `regex` has no look-behind, so the preceding char is captured and re-emitted.
static RE_LETTER_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-zА-Яа-яЁё])[0-9]{1,3}\b").unwrap());

static RE_QUOTE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r#"([”"»])[0-9]{1,3}\b"#).unwrap());

/// Remove footnote markers from one content line.
pub fn strip_footnotes(line: &str) -> Cow<'_, str> {
    match RE_LETTER_MARKER.replace_all(line, "$1") {
        Cow::Borrowed(s) => RE_QUOTE_MARKER.replace_all(s, "$1"),
        Cow::Owned(s) => Cow::Owned(RE_QUOTE_MARKER.replace_all(&s, "$1").into_owned()),
    }
}
