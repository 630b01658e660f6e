//! Pipeline stages for reconstructing prose from extracted PDF text.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ classify ──▶ footnote ──▶ reassemble ──▶ phrase
//! (path/URL) (pages)    (per line)   (per line)   (paragraphs)   (optional)
//! ```
//!
//! 1. [`input`]      — canonicalise a path or URL to a local file, sniff PDF vs text
//! 2. [`extract`]    — raw per-page text via pdfium or form-feed splitting;
//!    PDF work runs in `spawn_blocking`
//! 3. [`classify`]   — drop blank lines, page numbers, stop phrases, running headers
//! 4. [`footnote`]   — remove footnote markers glued to words and quotes
//! 5. [`reassemble`] — merge wrapped lines into paragraphs
//! 6. [`phrase`]     — optional slice between two phrases
//!
//! Stages 3–6 are pure and are driven together by [`clean::clean_pages`].

pub mod classify;
pub mod clean;
pub mod extract;
pub mod footnote;
pub mod input;
pub mod phrase;
pub mod reassemble;
pub mod search;

pub use classify::{DropReason, LineClass, LineClassifier, StopPhrases};
pub use clean::{
    clean_pages, clean_text, truncate_at_footer, CleanOptions, CleanedDocument, LineCounts,
    ReassemblyMode,
};
pub use phrase::PhraseRange;
pub use reassemble::{reassemble, ParagraphReassembler, PARAGRAPH_SEPARATOR};
