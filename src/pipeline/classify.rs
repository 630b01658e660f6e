//! Line classification: decide whether a trimmed line is page furniture.
//!
//! PDF text layers interleave body prose with page numbers, running
//! headers/footers ("colontituls") and publisher boilerplate. Each rule below
//! is a cheap predicate on a single line; the first rule that matches drops
//! the line.
//!
//! The colontitul rule trades some false positives (short capitalised
//! sentences that carry a number and no terminal punctuation) for
//! simplicity. It can be switched off through
//! [`CleanOptions::drop_running_headers`](crate::pipeline::CleanOptions).

use crate::pipeline::search::fold;
use serde::{Deserialize, Serialize};

/// Verdict for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    Keep,
    Drop(DropReason),
}

/// Which rule dropped a line. Used for stats and debug logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropReason {
    Blank,
    PageNumber,
    StopPhrase,
    RunningHeader,
}

/// Case-insensitive boilerplate phrases; any line containing one is dropped.
///
/// Entries are trimmed and lowercased on construction. Blank entries are
/// discarded: an empty substring matches every line and would silently
/// erase the whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct StopPhrases(Vec<String>);

impl StopPhrases {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries: Vec<String> = phrases
            .into_iter()
            .map(|p| fold(p.as_ref().trim()))
            .filter(|p| !p.is_empty())
            .collect();
        entries.sort();
        entries.dedup();
        Self(entries)
    }

    /// Parse a newline-separated list, one phrase per line.
    pub fn from_lines(text: &str) -> Self {
        Self::new(text.lines())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// `true` when the lowercased `line` contains any entry.
    pub fn matches(&self, line: &str) -> bool {
        if self.0.is_empty() {
            return false;
        }
        let lowered = fold(line);
        self.0.iter().any(|p| lowered.contains(p.as_str()))
    }
}

impl From<Vec<String>> for StopPhrases {
    fn from(v: Vec<String>) -> Self {
        Self::new(v)
    }
}

impl From<StopPhrases> for Vec<String> {
    fn from(s: StopPhrases) -> Self {
        s.0
    }
}

/// Line classifier bound to one run's configuration.
#[derive(Debug, Clone, Copy)]
pub struct LineClassifier<'a> {
    stop_phrases: &'a StopPhrases,
    drop_running_headers: bool,
}

impl<'a> LineClassifier<'a> {
    pub fn new(stop_phrases: &'a StopPhrases, drop_running_headers: bool) -> Self {
        Self {
            stop_phrases,
            drop_running_headers,
        }
    }

    /// Classify an already-trimmed line.
    pub fn classify(&self, line: &str) -> LineClass {
        if line.is_empty() {
            return LineClass::Drop(DropReason::Blank);
        }
        if line.chars().all(|c| c.is_ascii_digit()) {
            return LineClass::Drop(DropReason::PageNumber);
        }
        if self.stop_phrases.matches(line) {
            return LineClass::Drop(DropReason::StopPhrase);
        }
        if self.drop_running_headers && is_running_header(line) {
            return LineClass::Drop(DropReason::RunningHeader);
        }
        LineClass::Keep
    }
}

const CLAUSE_END: [char; 6] = ['.', '!', '?', ',', ';', ':'];

/// Capitalised, unpunctuated at the end, and carrying a digit somewhere:
/// "Journal of History 12 (2019)", "Глава 3".
fn is_running_header(line: &str) -> bool {
    let starts_upper = line.chars().next().is_some_and(char::is_uppercase);
    let ends_clause = line.chars().next_back().is_some_and(|c| CLAUSE_END.contains(&c));
    starts_upper && !ends_clause && line.chars().any(|c| c.is_ascii_digit())
}
