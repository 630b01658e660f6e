//! Input resolution: normalise a user-supplied path or URL to a local file.
//!
//! URLs are downloaded into a `TempDir` that lives as long as the returned
//! [`ResolvedInput`], so the file is cleaned up automatically even on panic.
//! The first bytes are sniffed to decide how page text will be read: `%PDF`
//! goes to pdfium, anything else is treated as form-feed separated text.

use crate::error::Pdf2TextError;
use crate::output::SourceKind;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// The resolved input: a local path or a downloaded temp file.
pub enum ResolvedInput {
    /// Input was already a local file.
    Local { path: PathBuf, kind: SourceKind },
    /// Input was a URL; the file was downloaded to a temp directory.
    /// The `TempDir` is kept alive to prevent cleanup until processing completes.
    Downloaded {
        path: PathBuf,
        kind: SourceKind,
        _temp_dir: TempDir,
    },
}

impl ResolvedInput {
    /// Get the path to the file regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local { path, .. } => path,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            ResolvedInput::Local { kind, .. } | ResolvedInput::Downloaded { kind, .. } => *kind,
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Classify a file by its leading bytes.
pub fn sniff_kind(head: &[u8]) -> SourceKind {
    if head.starts_with(PDF_MAGIC) {
        SourceKind::Pdf
    } else {
        SourceKind::PlainText
    }
}

/// Resolve the input string to a local file path.
///
/// If the input is a URL, download it to a temporary directory.
/// If the input is a local file, validate it exists and is readable.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, Pdf2TextError> {
    if input.trim().is_empty() {
        return Err(Pdf2TextError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input)
    }
}

/// Resolve a local file path, validating existence and sniffing its kind.
fn resolve_local(path_str: &str) -> Result<ResolvedInput, Pdf2TextError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(Pdf2TextError::FileNotFound { path });
    }
    if path.is_dir() {
        return Err(Pdf2TextError::InvalidInput {
            input: path_str.to_string(),
        });
    }

    let kind = match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut head = [0u8; 4];
            let n = f.read(&mut head).unwrap_or(0);
            sniff_kind(&head[..n])
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2TextError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Pdf2TextError::FileNotFound { path });
        }
    };

    debug!("Resolved local input: {} ({:?})", path.display(), kind);
    Ok(ResolvedInput::Local { path, kind })
}

/// Download a URL to a temporary directory and return the path.
async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, Pdf2TextError> {
    info!("Downloading from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Pdf2TextError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            Pdf2TextError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            Pdf2TextError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(Pdf2TextError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let filename = filename_from_url(url);

    let temp_dir = TempDir::new().map_err(|e| Pdf2TextError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(&filename);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Pdf2TextError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| Pdf2TextError::Internal(format!("Failed to write temp file: {}", e)))?;

    let kind = sniff_kind(&bytes[..bytes.len().min(PDF_MAGIC.len())]);
    info!("Downloaded to: {} ({:?})", file_path.display(), kind);

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        kind,
        _temp_dir: temp_dir,
    })
}

/// Last path segment of the URL if it looks like a file name.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded.pdf".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url("doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn test_sniff_kind() {
        assert_eq!(sniff_kind(b"%PDF-1.7"), SourceKind::Pdf);
        assert_eq!(sniff_kind(b"Hello"), SourceKind::PlainText);
        assert_eq!(sniff_kind(b"%P"), SourceKind::PlainText);
        assert_eq!(sniff_kind(b""), SourceKind::PlainText);
    }

    #[test]
    fn test_filename_from_url() {
        assert_eq!(
            filename_from_url("https://example.com/papers/article.pdf"),
            "article.pdf"
        );
        assert_eq!(filename_from_url("https://example.com/"), "downloaded.pdf");
        assert_eq!(filename_from_url("not a url"), "downloaded.pdf");
    }

    #[tokio::test]
    async fn test_resolve_local_text_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "Page one\x0cPage two").unwrap();
        let resolved = resolve_input(tmp.path().to_str().unwrap(), 5)
            .await
            .unwrap();
        assert_eq!(resolved.kind(), SourceKind::PlainText);
        assert_eq!(resolved.path(), tmp.path());
    }

    #[tokio::test]
    async fn test_resolve_missing_file() {
        let err = resolve_input("/definitely/not/here.pdf", 5).await.err().unwrap();
        assert!(matches!(err, Pdf2TextError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_blank_input() {
        let err = resolve_input("  ", 5).await.err().unwrap();
        assert!(matches!(err, Pdf2TextError::InvalidInput { .. }));
    }
}
