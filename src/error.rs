//! Error types for the edgequake-pdf2text library.
//!
//! Two tiers reflect two distinct kinds of failure:
//!
//! * [`CleanFailure`] — **Recoverable**: the text was read, but the cleaning
//!   pipeline has nothing to hand back (no raw text, everything filtered as
//!   noise, a phrase boundary missing). These are user-facing conditions and
//!   are returned as plain values from [`crate::pipeline::clean_pages`].
//!
//! * [`Pdf2TextError`] — **Fatal** for one document: the input could not be
//!   read at all (bad path, corrupt PDF, wrong password, download failure).
//!   The single-document entry points also wrap a [`CleanFailure`] in
//!   [`Pdf2TextError::Clean`] so callers get one `Result` type.
//!
//! Batch processing never fails as a whole: each document carries its own
//! [`DocumentError`] inside [`crate::output::DocumentResult`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-pdf2text library.
#[derive(Debug, Error)]
pub enum Pdf2TextError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// Selected page numbers exceed the actual page count.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// pdfium could not return the text layer of a page.
    #[error("Text extraction failed for page {page}: {detail}")]
    TextExtractionFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Text extraction from PDF files needs the pdfium shared library.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Or place libpdfium next to the binary / in the working directory.\n\
Plain-text inputs (pages separated by form feeds) do not need pdfium.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Cleaning outcome ──────────────────────────────────────────────────
    /// The cleaning pipeline produced no usable text.
    #[error(transparent)]
    Clean(#[from] CleanFailure),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output text file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2TextError {
    /// `true` when the document was read but the cleaning pipeline reported
    /// a user-facing condition rather than an I/O or parsing fault.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Pdf2TextError::Clean(_))
    }
}

/// A recoverable, user-facing reason why cleaning produced no text.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum CleanFailure {
    /// No raw text at all, or every page was blank.
    #[error("The document contains no extractable text.")]
    EmptyInput,

    /// Raw text was present but every line was filtered out as noise.
    #[error("All text was filtered out (page numbers, running headers, stop phrases).")]
    EmptyResult,

    /// The start phrase does not occur in the cleaned text.
    #[error("Start phrase {phrase:?} was not found in the text.")]
    StartPhraseNotFound { phrase: String },

    /// The end phrase does not occur at or after the start phrase.
    #[error("End phrase {phrase:?} was not found after the start phrase.")]
    EndPhraseNotFound { phrase: String },
}

/// A non-fatal error for a single document of a batch.
///
/// Stored in [`crate::output::DocumentResult`]; the batch continues.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum DocumentError {
    /// The input could not be read or extracted.
    #[error("{input}: {detail}")]
    Failed { input: String, detail: String },

    /// The input was read but cleaning reported a recoverable condition.
    #[error("{input}: {reason}")]
    Clean { input: String, reason: CleanFailure },
}

impl DocumentError {
    /// Classify a [`Pdf2TextError`] raised while processing `input`.
    pub fn from_error(input: &str, err: Pdf2TextError) -> Self {
        match err {
            Pdf2TextError::Clean(reason) => DocumentError::Clean {
                input: input.to_string(),
                reason,
            },
            other => DocumentError::Failed {
                input: input.to_string(),
                detail: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_out_of_range_display() {
        let e = Pdf2TextError::PageOutOfRange { page: 12, total: 10 };
        let msg = e.to_string();
        assert!(msg.contains("Page 12"), "got: {msg}");
        assert!(msg.contains("10 pages"), "got: {msg}");
    }

    #[test]
    fn clean_failure_is_transparent() {
        let e = Pdf2TextError::from(CleanFailure::StartPhraseNotFound {
            phrase: "Глава".into(),
        });
        assert!(e.to_string().contains("Глава"));
        assert!(e.is_recoverable());
    }

    #[test]
    fn fatal_errors_are_not_recoverable() {
        let e = Pdf2TextError::PasswordRequired {
            path: PathBuf::from("secret.pdf"),
        };
        assert!(!e.is_recoverable());
        assert!(e.to_string().contains("--password"));
    }

    #[test]
    fn document_error_keeps_clean_reason() {
        let err = DocumentError::from_error("a.pdf", CleanFailure::EmptyResult.into());
        match err {
            DocumentError::Clean { input, reason } => {
                assert_eq!(input, "a.pdf");
                assert_eq!(reason, CleanFailure::EmptyResult);
            }
            other => panic!("expected Clean, got {other:?}"),
        }
    }

    #[test]
    fn document_error_flattens_fatal_detail() {
        let err = DocumentError::from_error(
            "b.pdf",
            Pdf2TextError::FileNotFound {
                path: PathBuf::from("b.pdf"),
            },
        );
        assert!(err.to_string().starts_with("b.pdf: Input file not found"));
    }
}
