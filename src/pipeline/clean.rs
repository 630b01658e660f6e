//! The cleaning pipeline proper: raw page text in, [`CleanedDocument`] out.
//!
//! Pure and synchronous. Every call owns its buffers, so documents can be
//! cleaned on as many threads as the host likes.

use crate::error::CleanFailure;
use crate::pipeline::classify::{DropReason, LineClass, LineClassifier, StopPhrases};
use crate::pipeline::extract::split_pages;
use crate::pipeline::footnote::strip_footnotes;
use crate::pipeline::phrase::PhraseRange;
use crate::pipeline::reassemble::{ParagraphReassembler, PARAGRAPH_SEPARATOR};
use crate::pipeline::search::find_ignore_case;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// How page boundaries interact with paragraph reassembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReassemblyMode {
    /// `PerPage` when a footer marker is configured, `Document` otherwise.
    #[default]
    Auto,
    /// Concatenate all pages, then reassemble as one stream of lines.
    Document,
    /// Reassemble each page on its own; never merge across a page break.
    PerPage,
}

impl ReassemblyMode {
    /// Resolve `Auto` into a concrete mode.
    pub fn resolve(self, has_footer_marker: bool) -> Self {
        match self {
            ReassemblyMode::Auto if has_footer_marker => ReassemblyMode::PerPage,
            ReassemblyMode::Auto => ReassemblyMode::Document,
            other => other,
        }
    }
}

/// Options for one cleaning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanOptions {
    /// Lines containing any of these (case-insensitive) are dropped.
    pub stop_phrases: StopPhrases,

    /// Each page is cut at the first case-insensitive occurrence of this
    /// marker; the marker and everything after it are discarded.
    pub footer_marker: Option<String>,

    /// Optional slice of the cleaned text between two phrases.
    pub phrase_range: Option<PhraseRange>,

    /// Default: [`ReassemblyMode::Auto`].
    pub reassembly: ReassemblyMode,

    /// Apply the running-header heuristic. Default: true.
    pub drop_running_headers: bool,

    /// Remove footnote markers glued to words and quotes. Default: true.
    pub strip_footnotes: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            stop_phrases: StopPhrases::default(),
            footer_marker: None,
            phrase_range: None,
            reassembly: ReassemblyMode::default(),
            drop_running_headers: true,
            strip_footnotes: true,
        }
    }
}

impl CleanOptions {
    /// The footer marker, unless it is blank.
    fn active_footer_marker(&self) -> Option<&str> {
        self.footer_marker
            .as_deref()
            .filter(|m| !m.trim().is_empty())
    }
}

/// Per-rule line counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCounts {
    pub kept: usize,
    pub blank: usize,
    pub page_numbers: usize,
    pub stop_phrases: usize,
    pub running_headers: usize,
}

impl LineCounts {
    fn record(&mut self, reason: DropReason) {
        match reason {
            DropReason::Blank => self.blank += 1,
            DropReason::PageNumber => self.page_numbers += 1,
            DropReason::StopPhrase => self.stop_phrases += 1,
            DropReason::RunningHeader => self.running_headers += 1,
        }
    }

    /// Non-blank lines that were discarded.
    pub fn dropped(&self) -> usize {
        self.page_numbers + self.stop_phrases + self.running_headers
    }
}

/// Result of a successful cleaning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedDocument {
    /// Paragraphs separated by exactly one blank line.
    pub text: String,
    /// Number of paragraphs in `text`.
    pub paragraph_count: usize,
    /// Which lines were kept or dropped, and why.
    pub lines: LineCounts,
    /// Resolved reassembly mode used for this run.
    pub mode: ReassemblyMode,
}

/// Cut `page` at the first case-insensitive occurrence of `marker`.
pub fn truncate_at_footer<'p>(page: &'p str, marker: Option<&str>) -> &'p str {
    match marker.and_then(|m| find_ignore_case(page, m, 0)) {
        Some(found) => &page[..found.start],
        None => page,
    }
}

/// Clean raw per-page text into paragraph-structured prose.
///
/// Returns a [`CleanFailure`] when there is nothing to hand back: no raw
/// text at all ([`CleanFailure::EmptyInput`]), every line filtered out as
/// noise ([`CleanFailure::EmptyResult`]), or a missing phrase boundary.
pub fn clean_pages<S: AsRef<str>>(
    pages: &[S],
    options: &CleanOptions,
) -> Result<CleanedDocument, CleanFailure> {
    if pages.iter().all(|p| p.as_ref().trim().is_empty()) {
        return Err(CleanFailure::EmptyInput);
    }

    let classifier = LineClassifier::new(&options.stop_phrases, options.drop_running_headers);
    let footer = options.active_footer_marker();
    let mode = options.reassembly.resolve(footer.is_some());
    let mut lines = LineCounts::default();

    let truncated: Vec<&str> = pages
        .iter()
        .map(|p| truncate_at_footer(p.as_ref(), footer))
        .collect();

    let paragraphs: Vec<String> = match mode {
        ReassemblyMode::PerPage => truncated
            .iter()
            .flat_map(|page| {
                reassemble_lines(page, &classifier, options.strip_footnotes, &mut lines)
            })
            .collect(),
        _ => reassemble_lines(
            &truncated.join("\n"),
            &classifier,
            options.strip_footnotes,
            &mut lines,
        ),
    };

    debug!(
        pages = pages.len(),
        ?mode,
        kept = lines.kept,
        dropped = lines.dropped(),
        paragraphs = paragraphs.len(),
        "Reassembled document"
    );

    if paragraphs.is_empty() {
        return Err(CleanFailure::EmptyResult);
    }

    let mut text = paragraphs.join(PARAGRAPH_SEPARATOR);
    if let Some(ref range) = options.phrase_range {
        text = range.extract(&text)?.to_string();
    }

    Ok(CleanedDocument {
        paragraph_count: text.split(PARAGRAPH_SEPARATOR).count(),
        text,
        lines,
        mode,
    })
}

/// Clean a single string whose pages are separated by form feeds.
pub fn clean_text(raw: &str, options: &CleanOptions) -> Result<CleanedDocument, CleanFailure> {
    clean_pages(&split_pages(raw), options)
}

/// Classify, strip and reassemble the lines of one text block.
fn reassemble_lines(
    text: &str,
    classifier: &LineClassifier<'_>,
    strip: bool,
    counts: &mut LineCounts,
) -> Vec<String> {
    let mut reassembler = ParagraphReassembler::new();
    for raw in text.lines() {
        let line = raw.trim();
        match classifier.classify(line) {
            LineClass::Drop(reason) => {
                if reason != DropReason::Blank {
                    trace!(?reason, line, "Dropped line");
                }
                counts.record(reason);
            }
            LineClass::Keep => {
                counts.kept += 1;
                if strip {
                    reassembler.push_line(&strip_footnotes(line));
                } else {
                    reassembler.push_line(line);
                }
            }
        }
    }
    reassembler.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> CleanOptions {
        CleanOptions::default()
    }

    #[test]
    fn test_end_to_end_single_page() {
        let page = "In that period the society5 was divided,\nclasses fought, and the con-\nflict grew.\n17\nA new era began.";
        let doc = clean_pages(&[page], &opts()).unwrap();
        assert_eq!(
            doc.text,
            "In that period the society was divided, classes fought, and the conflict grew.\n\nA new era began."
        );
        assert_eq!(doc.paragraph_count, 2);
        assert_eq!(doc.lines.page_numbers, 1);
        assert_eq!(doc.mode, ReassemblyMode::Document);
    }

    #[test]
    fn test_digit_lines_never_survive() {
        let doc = clean_pages(&["Prose continues\n123\nhere.\n  456  "], &opts()).unwrap();
        assert_eq!(doc.text, "Prose continues here.");
        assert!(!doc.text.contains("123"));
        assert!(!doc.text.contains("456"));
    }

    #[test]
    fn test_stop_phrase_lines_are_absent() {
        let options = CleanOptions {
            stop_phrases: StopPhrases::new(["downloaded from"]),
            ..opts()
        };
        let page = "Body text begins\nThis content DOWNLOADED FROM example.org\nand ends here.";
        let doc = clean_pages(&[page], &options).unwrap();
        assert_eq!(doc.text, "Body text begins and ends here.");
        assert_eq!(doc.lines.stop_phrases, 1);
    }

    #[test]
    fn test_blank_stop_phrase_does_not_erase_document() {
        let options = CleanOptions {
            stop_phrases: StopPhrases::new(["", " "]),
            ..opts()
        };
        let doc = clean_pages(&["Everything stays."], &options).unwrap();
        assert_eq!(doc.text, "Everything stays.");
    }

    #[test]
    fn test_footer_truncation_is_per_page() {
        let options = CleanOptions {
            footer_marker: Some("Notes".into()),
            ..opts()
        };
        let pages = [
            "First page text.\nNOTES\n1. A footnote.",
            "Second page, no marker here.",
        ];
        let doc = clean_pages(&pages, &options).unwrap();
        assert_eq!(doc.mode, ReassemblyMode::PerPage);
        assert_eq!(doc.text, "First page text.\n\nSecond page, no marker here.");
        assert!(!doc.text.contains("footnote"));
    }

    #[test]
    fn test_per_page_mode_never_merges_across_pages() {
        let pages = ["A sentence that wraps onto", "the next page."];
        let per_page = CleanOptions {
            reassembly: ReassemblyMode::PerPage,
            ..opts()
        };
        let doc = clean_pages(&pages, &per_page).unwrap();
        assert_eq!(doc.text, "A sentence that wraps onto\n\nthe next page.");

        let whole = clean_pages(&pages, &opts()).unwrap();
        assert_eq!(whole.text, "A sentence that wraps onto the next page.");
    }

    #[test]
    fn test_document_mode_with_footer_marker() {
        let options = CleanOptions {
            footer_marker: Some("notes".into()),
            reassembly: ReassemblyMode::Document,
            ..opts()
        };
        let pages = ["Text that wraps\nNotes: 1. x", "onto page two."];
        let doc = clean_pages(&pages, &options).unwrap();
        assert_eq!(doc.text, "Text that wraps onto page two.");
    }

    #[test]
    fn test_blank_footer_marker_is_ignored() {
        let options = CleanOptions {
            footer_marker: Some("   ".into()),
            ..opts()
        };
        let doc = clean_pages(&["Keep all of it."], &options).unwrap();
        assert_eq!(doc.text, "Keep all of it.");
        assert_eq!(doc.mode, ReassemblyMode::Document);
    }

    #[test]
    fn test_phrase_range_applied_after_reassembly() {
        let options = CleanOptions {
            phrase_range: Some(PhraseRange::new("intro", "middle").unwrap()),
            ..opts()
        };
        let pages = ["A. Intro text. B. Mid-", "dle part. C. End."];
        let doc = clean_pages(&pages, &options).unwrap();
        assert_eq!(doc.text, "Intro text. B. Middle");
        assert_eq!(doc.paragraph_count, 1);
    }

    #[test]
    fn test_phrase_failures_are_reported() {
        let options = CleanOptions {
            phrase_range: Some(PhraseRange::new("Intro", "Epilogue").unwrap()),
            ..opts()
        };
        let err = clean_pages(&["Intro text."], &options).unwrap_err();
        assert_eq!(
            err,
            CleanFailure::EndPhraseNotFound {
                phrase: "Epilogue".into()
            }
        );
    }

    #[test]
    fn test_empty_input_and_empty_result() {
        let none: [&str; 0] = [];
        assert_eq!(clean_pages(&none, &opts()), Err(CleanFailure::EmptyInput));
        assert_eq!(clean_pages(&["  \n\n", ""], &opts()), Err(CleanFailure::EmptyInput));
        assert_eq!(
            clean_pages(&["12\n13\nJournal of History 4"], &opts()),
            Err(CleanFailure::EmptyResult)
        );
    }

    #[test]
    fn test_footnote_stripping_can_be_disabled() {
        let options = CleanOptions {
            strip_footnotes: false,
            ..opts()
        };
        let doc = clean_pages(&["society5 was divided"], &options).unwrap();
        assert_eq!(doc.text, "society5 was divided");
    }

    #[test]
    fn test_crlf_pages() {
        let doc = clean_pages(&["Line one\r\ncontinues.\r\n"], &opts()).unwrap();
        assert_eq!(doc.text, "Line one continues.");
    }

    #[test]
    fn test_clean_text_splits_on_form_feeds() {
        let per_page = CleanOptions {
            reassembly: ReassemblyMode::PerPage,
            ..opts()
        };
        let doc = clean_text("wraps onto\x0cthe next page.\x0c", &per_page).unwrap();
        assert_eq!(doc.text, "wraps onto\n\nthe next page.");
        assert_eq!(clean_text("", &opts()), Err(CleanFailure::EmptyInput));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: CleanOptions =
            serde_json::from_str(r#"{"footer_marker": "Notes", "reassembly": "per-page"}"#)
                .unwrap();
        assert!(options.drop_running_headers);
        assert!(options.strip_footnotes);
        assert_eq!(options.reassembly, ReassemblyMode::PerPage);
    }

    #[test]
    fn test_options_reject_blank_phrase_range() {
        let json = r#"{"phrase_range": {"start": " ", "end": "x"}}"#;
        assert!(serde_json::from_str::<CleanOptions>(json).is_err());
    }
}
