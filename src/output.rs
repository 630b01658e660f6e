//! Output types returned by the extraction entry points.

use crate::error::DocumentError;
use crate::pipeline::{LineCounts, ReassemblyMode};
use serde::{Deserialize, Serialize};

/// Characters of body text on a typical A4 page.
pub const CHARS_PER_A4_PAGE: usize = 1725;

/// Result of extracting and cleaning one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Cleaned text: paragraphs separated by a blank line.
    pub text: String,
    /// Size metrics of `text`.
    pub metrics: TextMetrics,
    /// Metadata of the source document.
    pub metadata: DocumentMetadata,
    /// Run statistics.
    pub stats: ExtractionStats,
}

/// Size of a cleaned text, as shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextMetrics {
    /// Characters excluding spaces, `\n`, `\r` and `\t`.
    pub chars_without_spaces: usize,
    /// `chars_without_spaces / 1725`.
    pub a4_pages: f64,
}

impl TextMetrics {
    pub fn measure(text: &str) -> Self {
        let chars_without_spaces = text
            .chars()
            .filter(|c| !matches!(c, ' ' | '\n' | '\r' | '\t'))
            .count();
        Self {
            chars_without_spaces,
            a4_pages: chars_without_spaces as f64 / CHARS_PER_A4_PAGE as f64,
        }
    }

    /// A4 page estimate rendered with two decimals, e.g. `"1.37"`.
    pub fn a4_pages_display(&self) -> String {
        format!("{:.2}", self.a4_pages)
    }
}

/// Where the raw page text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// PDF text layer via pdfium.
    Pdf,
    /// UTF-8 text, pages separated by form feeds.
    PlainText,
}

/// Metadata describing the input document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub source: SourceKind,
    pub page_count: usize,
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    /// PDF version string; empty for plain text.
    pub pdf_version: String,
}

impl DocumentMetadata {
    /// Metadata for a plain-text input with `page_count` pages.
    pub fn plain_text(page_count: usize) -> Self {
        Self {
            source: SourceKind::PlainText,
            page_count,
            title: None,
            author: None,
            subject: None,
            creator: None,
            producer: None,
            pdf_version: String::new(),
        }
    }
}

/// Statistics for one extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages in the source document.
    pub total_pages: usize,
    /// Pages handed to the cleaning pipeline after page selection.
    pub selected_pages: usize,
    /// Paragraphs in the output text.
    pub paragraphs: usize,
    /// Kept/dropped line counts.
    pub lines: LineCounts,
    /// Reassembly mode actually used.
    pub mode: ReassemblyMode,
    /// Wall-clock time spent reading page text.
    pub extract_duration_ms: u64,
    /// Wall-clock time spent in the cleaning pipeline.
    pub clean_duration_ms: u64,
    /// End-to-end wall-clock time.
    pub total_duration_ms: u64,
}

/// Outcome for one document of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    /// Position of the input in the batch (0-indexed).
    pub index: usize,
    /// The input path or URL as given.
    pub input: String,
    /// Present on success.
    pub output: Option<ExtractionOutput>,
    /// Present on failure.
    pub error: Option<DocumentError>,
}

impl DocumentResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_skip_whitespace() {
        let m = TextMetrics::measure("ab c\n\nd\te\r\n");
        assert_eq!(m.chars_without_spaces, 5);
    }

    #[test]
    fn test_metrics_count_chars_not_bytes() {
        let m = TextMetrics::measure("привет мир");
        assert_eq!(m.chars_without_spaces, 9);
    }

    #[test]
    fn test_a4_page_estimate() {
        let text = "x".repeat(3450);
        let m = TextMetrics::measure(&text);
        assert_eq!(m.a4_pages_display(), "2.00");
        let m = TextMetrics::measure(&"y".repeat(100));
        assert_eq!(m.a4_pages_display(), "0.06");
        assert_eq!(TextMetrics::measure("").a4_pages_display(), "0.00");
    }

    #[test]
    fn test_default_mode_in_stats() {
        assert_eq!(ExtractionStats::default().mode, ReassemblyMode::Auto);
    }
}
