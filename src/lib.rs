//! # edgequake-pdf2text
//!
//! Reconstruct clean, paragraph-structured prose from the text layer of PDF
//! documents.
//!
//! ## Why this crate?
//!
//! Text pulled out of a PDF is broken wherever the page layout broke it:
//! mid-sentence, mid-word, and interleaved with page numbers, running
//! headers and footnote markers. This crate undoes that with a small set of
//! deterministic line heuristics and hands back prose you can read, search
//! or feed to downstream tools.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / text
//!  │
//!  ├─ 1. Input       resolve local file or download from URL
//!  ├─ 2. Extract     per-page text via pdfium, or split on form feeds
//!  ├─ 3. Classify    drop blank lines, page numbers, stop phrases, headers
//!  ├─ 4. Footnotes   strip markers glued to words: `society5` → `society`
//!  ├─ 5. Reassemble  merge wrapped lines into paragraphs, undo hyphenation
//!  ├─ 6. Phrase      optional slice between two phrases
//!  └─ 7. Output      cleaned text + A4 page estimate + stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2text::{extract, ExtractionConfig, PageSelection};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::builder()
//!         .pages(PageSelection::Range(5, 20))
//!         .stop_phrases(["Downloaded from"])
//!         .build()?;
//!     let output = extract("book.pdf", &config).await?;
//!     println!("{}", output.text);
//!     eprintln!("{} chars, ~{} A4 pages",
//!         output.metrics.chars_without_spaces,
//!         output.metrics.a4_pages_display());
//!     Ok(())
//! }
//! ```
//!
//! The cleaning stages are pure functions and can be used without any I/O:
//!
//! ```rust
//! use edgequake_pdf2text::{clean_pages, CleanOptions};
//!
//! let pages = ["Then the society5 was divided,\nand torn apart by con-\nflict.\n12\nA new era began."];
//! let doc = clean_pages(&pages, &CleanOptions::default()).unwrap();
//! assert_eq!(
//!     doc.text,
//!     "Then the society was divided, and torn apart by conflict.\n\nA new era began."
//! );
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2text` binary (clap + anyhow + tracing-subscriber) |
//!
//! PDF inputs need the pdfium shared library at runtime (see
//! [`pipeline::extract::bind_pdfium`]); plain-text inputs do not.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, PageSelection};
pub use convert::{
    extract, extract_batch, extract_from_bytes, extract_sync, extract_to_file, inspect,
};
pub use error::{CleanFailure, DocumentError, Pdf2TextError};
pub use output::{
    DocumentMetadata, DocumentResult, ExtractionOutput, ExtractionStats, SourceKind, TextMetrics,
    CHARS_PER_A4_PAGE,
};
pub use pipeline::{
    clean_pages, clean_text, CleanOptions, CleanedDocument, PhraseRange, ReassemblyMode,
    StopPhrases,
};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{extract_stream, DocumentStream};
