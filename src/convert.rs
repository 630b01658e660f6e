//! Eager extraction entry points.
//!
//! [`extract`] handles one document and returns once its text is cleaned.
//! [`extract_batch`] runs many documents with bounded concurrency and
//! returns every outcome in input order; use [`crate::stream::extract_stream`]
//! to receive them as they finish instead.

use crate::config::ExtractionConfig;
use crate::error::Pdf2TextError;
use crate::output::{DocumentMetadata, DocumentResult, ExtractionOutput, ExtractionStats, TextMetrics};
use crate::pipeline::{clean_pages, extract, input};
use crate::stream::extract_stream;
use futures::StreamExt;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Extract clean, paragraph-structured text from a PDF or text file.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input_str` — Local file path or HTTP/HTTPS URL
/// * `config`    — Extraction configuration
///
/// # Errors
/// Fatal input errors (file not found, corrupt PDF, wrong password, page
/// selection outside the document) and, wrapped in
/// [`Pdf2TextError::Clean`], the recoverable cleaning outcomes: no text,
/// everything filtered, or a phrase boundary not found.
pub async fn extract(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Pdf2TextError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting extraction: {}", input_str);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;

    // ── Step 2: Read selected pages ──────────────────────────────────────
    let extract_start = Instant::now();
    let loaded = extract::load_pages(
        resolved.path(),
        resolved.kind(),
        config.password.as_deref(),
        &config.pages,
    )
    .await?;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;
    let metadata = loaded.metadata.clone();
    let selected_pages = loaded.pages.len();
    info!(
        "Read {}/{} pages in {}ms",
        selected_pages, metadata.page_count, extract_duration_ms
    );

    // ── Step 3: Clean ────────────────────────────────────────────────────
    let clean_start = Instant::now();
    let options = config.cleaning.clone();
    let cleaned = tokio::task::spawn_blocking(move || clean_pages(&loaded.texts(), &options))
        .await
        .map_err(|e| Pdf2TextError::Internal(format!("Cleaning task panicked: {}", e)))??;
    let clean_duration_ms = clean_start.elapsed().as_millis() as u64;
    debug!(
        "Cleaned in {}ms: {} lines kept, {} dropped",
        clean_duration_ms,
        cleaned.lines.kept,
        cleaned.lines.dropped()
    );

    // ── Step 4: Metrics ──────────────────────────────────────────────────
    let metrics = TextMetrics::measure(&cleaned.text);
    let stats = ExtractionStats {
        total_pages: metadata.page_count,
        selected_pages,
        paragraphs: cleaned.paragraph_count,
        lines: cleaned.lines,
        mode: cleaned.mode,
        extract_duration_ms,
        clean_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Extraction complete: {} paragraphs, {} chars (~{} A4 pages), {}ms total",
        stats.paragraphs,
        metrics.chars_without_spaces,
        metrics.a4_pages_display(),
        stats.total_duration_ms
    );

    Ok(ExtractionOutput {
        text: cleaned.text,
        metrics,
        metadata,
        stats,
    })
}

/// Extract a document and write the cleaned text directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn extract_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Pdf2TextError> {
    let output = extract(input_str, config).await?;
    let path = output_path.as_ref();
    let write_err = |e: std::io::Error| Pdf2TextError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("txt.tmp");
    tokio::fs::write(&tmp_path, &output.text)
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;

    Ok(output)
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Pdf2TextError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2TextError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(input_str, config))
}

/// Read document metadata without extracting or cleaning text.
pub async fn inspect(
    input_str: impl AsRef<str>,
    password: Option<&str>,
) -> Result<DocumentMetadata, Pdf2TextError> {
    let resolved = input::resolve_input(input_str.as_ref(), 120).await?;
    extract::read_metadata(resolved.path(), resolved.kind(), password).await
}

/// Extract clean text from document bytes held in memory.
///
/// The bytes are written to a managed [`tempfile`] that is removed on return.
pub async fn extract_from_bytes(
    bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Pdf2TextError> {
    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| Pdf2TextError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| Pdf2TextError::Internal(format!("tempfile write: {e}")))?;
    let path = tmp.path().to_string_lossy().to_string();
    // `tmp` is dropped (and the file deleted) when `extract` returns
    extract(&path, config).await
}

/// Extract many documents concurrently; results come back in input order.
///
/// Never fails as a whole: each [`DocumentResult`] carries its own output
/// or error.
pub async fn extract_batch<I, S>(inputs: I, config: &ExtractionConfig) -> Vec<DocumentResult>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut results: Vec<DocumentResult> = extract_stream(inputs, config).collect().await;
    results.sort_by_key(|r| r.index);
    results
}
