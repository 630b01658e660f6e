//! Page-text extraction: turn a resolved input into raw per-page strings.
//!
//! ## PDF inputs
//!
//! pdfium wraps a C++ library with thread-local state, so every call runs in
//! `tokio::task::spawn_blocking`. Only the text layer is read; scanned pages
//! without one come back empty and are reported as such by the cleaner.
//!
//! ## Plain-text inputs
//!
//! Any non-PDF file is read as UTF-8 and split into pages on form feeds
//! (`\x0c`), which is what `pdftotext` and most OCR tools emit between pages.
//! Invalid UTF-8 is replaced rather than rejected: upstream extraction is
//! lossy anyway.

use crate::config::PageSelection;
use crate::error::Pdf2TextError;
use crate::output::{DocumentMetadata, SourceKind};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Page delimiter in plain-text inputs.
pub const PAGE_BREAK: char = '\x0c';

/// Raw text of the selected pages plus document metadata.
#[derive(Debug, Clone)]
pub struct LoadedPages {
    /// `(page_index_0based, raw_text)` in page order.
    pub pages: Vec<(usize, String)>,
    pub metadata: DocumentMetadata,
}

impl LoadedPages {
    pub fn texts(&self) -> Vec<&str> {
        self.pages.iter().map(|(_, text)| text.as_str()).collect()
    }
}

/// Read the selected pages of `path`.
///
/// # Errors
/// [`Pdf2TextError::PageOutOfRange`] when the selection matches no page of
/// the document, plus the usual I/O and PDF errors.
pub async fn load_pages(
    path: &Path,
    kind: SourceKind,
    password: Option<&str>,
    selection: &PageSelection,
) -> Result<LoadedPages, Pdf2TextError> {
    match kind {
        SourceKind::Pdf => {
            let path = path.to_path_buf();
            let password = password.map(str::to_string);
            let selection = selection.clone();
            tokio::task::spawn_blocking(move || {
                load_pdf_pages_blocking(&path, password.as_deref(), &selection)
            })
            .await
            .map_err(|e| Pdf2TextError::Internal(format!("Extraction task panicked: {}", e)))?
        }
        SourceKind::PlainText => {
            let all = read_text_pages(path).await?;
            let total = all.len();
            let indices = selected_indices(selection, total)?;
            let mut all: Vec<Option<String>> = all.into_iter().map(Some).collect();
            let pages = indices
                .into_iter()
                .filter_map(|idx| all[idx].take().map(|text| (idx, text)))
                .collect();
            Ok(LoadedPages {
                pages,
                metadata: DocumentMetadata::plain_text(total),
            })
        }
    }
}

/// Read metadata only, without extracting page text.
pub async fn read_metadata(
    path: &Path,
    kind: SourceKind,
    password: Option<&str>,
) -> Result<DocumentMetadata, Pdf2TextError> {
    match kind {
        SourceKind::Pdf => {
            let path = path.to_path_buf();
            let pwd = password.map(str::to_string);
            tokio::task::spawn_blocking(move || read_pdf_metadata_blocking(&path, pwd.as_deref()))
                .await
                .map_err(|e| Pdf2TextError::Internal(format!("Metadata task panicked: {}", e)))?
        }
        SourceKind::PlainText => {
            let pages = read_text_pages(path).await?;
            Ok(DocumentMetadata::plain_text(pages.len()))
        }
    }
}

/// Split plain text into pages on form feeds.
///
/// A trailing form feed closes the last page rather than opening an empty one.
pub fn split_pages(text: &str) -> Vec<String> {
    let body = text.strip_suffix(PAGE_BREAK).unwrap_or(text);
    body.split(PAGE_BREAK).map(str::to_string).collect()
}

async fn read_text_pages(path: &Path) -> Result<Vec<String>, Pdf2TextError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => Pdf2TextError::PermissionDenied {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::NotFound => Pdf2TextError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => Pdf2TextError::Internal(format!("Failed to read {}: {}", path.display(), e)),
    })?;

    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!(
                "{} is not valid UTF-8; replacing invalid sequences",
                path.display()
            );
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };

    let pages = split_pages(&text);
    debug!("Read {} text pages from {}", pages.len(), path.display());
    Ok(pages)
}

fn selected_indices(selection: &PageSelection, total: usize) -> Result<Vec<usize>, Pdf2TextError> {
    let indices = selection.to_indices(total);
    if indices.is_empty() {
        return Err(Pdf2TextError::PageOutOfRange {
            page: selection.first_page().unwrap_or(0),
            total,
        });
    }
    Ok(indices)
}

/// Bind to the pdfium shared library.
///
/// `PDFIUM_LIB_PATH` (file or directory) wins; otherwise the working
/// directory, then the system library search path.
pub fn bind_pdfium() -> Result<Pdfium, Pdf2TextError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(p) if !p.trim().is_empty() => {
            let p = PathBuf::from(p);
            let lib = if p.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(&p)
            } else {
                p
            };
            Pdfium::bind_to_library(&lib)
        }
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| Pdf2TextError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, Pdf2TextError> {
    pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                Pdf2TextError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                Pdf2TextError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            Pdf2TextError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

/// Blocking implementation of PDF text extraction.
fn load_pdf_pages_blocking(
    pdf_path: &Path,
    password: Option<&str>,
    selection: &PageSelection,
) -> Result<LoadedPages, Pdf2TextError> {
    let pdfium = bind_pdfium()?;
    let document = open_document(&pdfium, pdf_path, password)?;
    let metadata = metadata_of(&document);

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let indices = selected_indices(selection, total_pages)?;
    let mut results = Vec::with_capacity(indices.len());

    for idx in indices {
        let page = pages
            .get(idx as u16)
            .map_err(|e| Pdf2TextError::TextExtractionFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?;

        let text = page
            .text()
            .map_err(|e| Pdf2TextError::TextExtractionFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?
            .all();

        if text.trim().is_empty() {
            warn!("Page {} has no text layer", idx + 1);
        } else {
            debug!("Extracted page {} → {} chars", idx + 1, text.chars().count());
        }

        results.push((idx, text));
    }

    Ok(LoadedPages {
        pages: results,
        metadata,
    })
}

/// Blocking implementation of metadata extraction.
fn read_pdf_metadata_blocking(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentMetadata, Pdf2TextError> {
    let pdfium = bind_pdfium()?;
    let document = open_document(&pdfium, pdf_path, password)?;
    Ok(metadata_of(&document))
}

fn metadata_of(document: &PdfDocument<'_>) -> DocumentMetadata {
    let metadata = document.metadata();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    DocumentMetadata {
        source: SourceKind::Pdf,
        page_count: document.pages().len() as usize,
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        pdf_version: format!("{:?}", document.version()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_split_pages() {
        assert_eq!(split_pages("one\x0ctwo\x0c"), vec!["one", "two"]);
        assert_eq!(split_pages("one\x0c\x0cthree"), vec!["one", "", "three"]);
        assert_eq!(split_pages("single"), vec!["single"]);
        assert_eq!(split_pages(""), vec![""]);
    }

    #[tokio::test]
    async fn test_load_text_pages_with_selection() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "first\x0csecond\x0cthird\x0c").unwrap();

        let loaded = load_pages(
            tmp.path(),
            SourceKind::PlainText,
            None,
            &PageSelection::Range(2, 3),
        )
        .await
        .unwrap();

        assert_eq!(loaded.metadata.page_count, 3);
        assert_eq!(loaded.metadata.source, SourceKind::PlainText);
        assert_eq!(
            loaded.pages,
            vec![(1, "second".to_string()), (2, "third".to_string())]
        );
        assert_eq!(loaded.texts(), vec!["second", "third"]);
    }

    #[tokio::test]
    async fn test_selection_outside_document_fails() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "only page").unwrap();

        let err = load_pages(
            tmp.path(),
            SourceKind::PlainText,
            None,
            &PageSelection::Single(4),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            Pdf2TextError::PageOutOfRange { page: 4, total: 1 }
        ));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"caf\xe9 text").unwrap();

        let loaded = load_pages(tmp.path(), SourceKind::PlainText, None, &PageSelection::All)
            .await
            .unwrap();
        assert_eq!(loaded.pages[0].1, "caf\u{FFFD} text");
    }
}
