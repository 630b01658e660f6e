//! Streaming batch API: emit documents as they complete.
//!
//! [`extract_stream`] yields one [`DocumentResult`] per input as soon as that
//! document is done. Up to `config.concurrency` documents are in flight at
//! once, so results arrive in completion order; sort by `index` if order
//! matters (or use [`crate::convert::extract_batch`], which does).

use crate::config::ExtractionConfig;
use crate::convert::extract;
use crate::error::DocumentError;
use crate::output::DocumentResult;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::{info, warn};

/// A boxed stream of per-document results.
pub type DocumentStream = Pin<Box<dyn Stream<Item = DocumentResult> + Send>>;

/// Extract many documents, streaming each result as it is ready.
///
/// Nothing runs until the stream is polled. `on_batch_start` fires on the
/// first poll, per-document callbacks as documents start and finish, and
/// `on_batch_complete` after the last result has been yielded.
pub fn extract_stream<I, S>(inputs: I, config: &ExtractionConfig) -> DocumentStream
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let inputs: Vec<String> = inputs.into_iter().map(Into::into).collect();
    let total = inputs.len();
    let concurrency = config.concurrency.max(1);

    let callback = config.progress_callback.clone();
    let started = stream::once(async move {
        info!(
            "Starting batch extraction: {} documents, concurrency {}",
            total, concurrency
        );
        if let Some(cb) = callback {
            cb.on_batch_start(total);
        }
    })
    .filter_map(|()| async { None::<DocumentResult> });

    let succeeded = Arc::new(AtomicUsize::new(0));
    let config_clone = config.clone();
    let counter = Arc::clone(&succeeded);

    let documents = stream::iter(inputs.into_iter().enumerate().map(move |(index, input)| {
        let cfg = config_clone.clone();
        let counter = Arc::clone(&counter);
        async move {
            let result = process_document(index, total, input, &cfg).await;
            if result.is_ok() {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            result
        }
    }))
    .buffer_unordered(concurrency);

    let callback = config.progress_callback.clone();
    let finished = stream::once(async move {
        let success = succeeded.load(Ordering::SeqCst);
        info!("Batch complete: {}/{} documents", success, total);
        if let Some(cb) = callback {
            cb.on_batch_complete(total, success);
        }
    })
    .filter_map(|()| async { None::<DocumentResult> });

    Box::pin(started.chain(documents).chain(finished))
}

async fn process_document(
    index: usize,
    total: usize,
    input: String,
    config: &ExtractionConfig,
) -> DocumentResult {
    if let Some(ref cb) = config.progress_callback {
        cb.on_document_start(index, total, &input);
    }

    match extract(&input, config).await {
        Ok(output) => {
            if let Some(ref cb) = config.progress_callback {
                cb.on_document_complete(index, total, output.metrics.chars_without_spaces);
            }
            DocumentResult {
                index,
                input,
                output: Some(output),
                error: None,
            }
        }
        Err(e) => {
            warn!("Document {} ({}) failed: {}", index + 1, input, e);
            if let Some(ref cb) = config.progress_callback {
                cb.on_document_error(index, total, &e.to_string());
            }
            let error = DocumentError::from_error(&input, e);
            DocumentResult {
                index,
                input,
                output: None,
                error: Some(error),
            }
        }
    }
}
