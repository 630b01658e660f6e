//! Unicode-aware case-insensitive substring search.
//!
//! Lowercasing can change the byte length of a character (`İ` becomes two
//! chars, Cyrillic letters stay two bytes but ASCII-only folding would miss
//! them entirely), so an offset found in a lowercased copy is not an offset
//! into the original. [`find_ignore_case`] keeps a per-byte map from the
//! folded text back to the original characters and returns ranges that are
//! always valid char boundaries of the haystack.

use std::ops::Range;

/// Lowercase `s` one character at a time.
///
/// Char-wise folding is used on both sides of every comparison so the
/// needle and the haystack are folded identically (`str::to_lowercase`
/// applies context-sensitive rules such as the Greek final sigma).
pub fn fold(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}

/// Find the first case-insensitive occurrence of `needle` in `haystack`
/// starting at byte offset `from`.
///
/// Returns the byte range of the match in `haystack`. An empty needle, or a
/// `from` that is out of bounds or not on a char boundary, never matches.
pub fn find_ignore_case(haystack: &str, needle: &str, from: usize) -> Option<Range<usize>> {
    let needle = fold(needle);
    if needle.is_empty() {
        return None;
    }
    let tail = haystack.get(from..)?;

    let mut folded = String::with_capacity(tail.len());
    // For every byte of `folded`: the original char's (start, end).
    let mut origin: Vec<(usize, usize)> = Vec::with_capacity(tail.len());

    for (idx, ch) in tail.char_indices() {
        let start = from + idx;
        let end = start + ch.len_utf8();
        for lower in ch.to_lowercase() {
            folded.push(lower);
            origin.extend(std::iter::repeat_n((start, end), lower.len_utf8()));
        }
    }

    let pos = folded.find(&needle)?;
    let (start, _) = origin[pos];
    let (_, end) = origin[pos + needle.len() - 1];
    Some(start..end)
}
