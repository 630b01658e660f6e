//! Configuration types for text extraction and cleaning.
//!
//! All behaviour is controlled through [`ExtractionConfig`], built via its
//! [`ExtractionConfigBuilder`]. The cleaning knobs live in a nested
//! [`CleanOptions`] so the pure pipeline can be driven without any of the
//! I/O settings.

use crate::error::Pdf2TextError;
use crate::pipeline::{CleanOptions, PhraseRange, ReassemblyMode, StopPhrases};
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for extracting clean text from a document.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_pdf2text::{ExtractionConfig, PageSelection};
///
/// let config = ExtractionConfig::builder()
///     .pages(PageSelection::Range(3, 12))
///     .stop_phrases(["Downloaded from"])
///     .footer_marker("Notes")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Page selection, applied before cleaning. Default: All pages.
    pub pages: PageSelection,

    /// Options forwarded to the cleaning pipeline.
    pub cleaning: CleanOptions,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Documents processed at once by the batch APIs. Default: 4.
    ///
    /// Each document is extracted on a blocking thread; values above the
    /// core count rarely help.
    pub concurrency: usize,

    /// Optional progress callback for batch processing.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            pages: PageSelection::default(),
            cleaning: CleanOptions::default(),
            password: None,
            download_timeout_secs: 120,
            concurrency: 4,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("pages", &self.pages)
            .field("cleaning", &self.cleaning)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("concurrency", &self.concurrency)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
            phrase_range: None,
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
    phrase_range: Option<(String, String)>,
}

impl ExtractionConfigBuilder {
    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    /// Replace the stop phrases. Blank entries are discarded.
    pub fn stop_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.cleaning.stop_phrases = StopPhrases::new(phrases);
        self
    }

    pub fn footer_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.cleaning.footer_marker = Some(marker.into());
        self
    }

    pub fn phrase_range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.phrase_range = Some((start.into(), end.into()));
        self
    }

    pub fn reassembly(mut self, mode: ReassemblyMode) -> Self {
        self.config.cleaning.reassembly = mode;
        self
    }

    pub fn drop_running_headers(mut self, v: bool) -> Self {
        self.config.cleaning.drop_running_headers = v;
        self
    }

    pub fn strip_footnotes(mut self, v: bool) -> Self {
        self.config.cleaning.strip_footnotes = v;
        self
    }

    pub fn cleaning(mut self, options: CleanOptions) -> Self {
        self.config.cleaning = options;
        self.phrase_range = None;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<ExtractionConfig, Pdf2TextError> {
        if let Some((start, end)) = self.phrase_range.take() {
            self.config.cleaning.phrase_range = Some(PhraseRange::new(start, end)?);
        }
        let c = &self.config;
        if c.concurrency == 0 {
            return Err(Pdf2TextError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if let PageSelection::Range(start, end) = c.pages {
            if start == 0 || start > end {
                return Err(Pdf2TextError::InvalidConfig(format!(
                    "Invalid page range {}-{}: pages are 1-indexed and start must be <= end",
                    start, end
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Specifies which pages of the document to extract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Extract all pages (default).
    #[default]
    All,
    /// Extract a single page (1-indexed).
    Single(usize),
    /// Extract a contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Extract specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    /// Lowest 1-indexed page the selection asks for, if any.
    pub fn first_page(&self) -> Option<usize> {
        match self {
            PageSelection::All => None,
            PageSelection::Single(p) => Some(*p),
            PageSelection::Range(start, _) => Some(*start),
            PageSelection::Set(pages) => pages.iter().copied().min(),
        }
    }
}
