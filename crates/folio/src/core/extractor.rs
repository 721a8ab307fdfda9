//! Top-level entry points.
//!
//! The pipeline is synchronous and blocking. The async entry points run it on
//! tokio's blocking pool and can bound the whole extraction with a timeout.

use crate::extractor::PdfExtractor;
use crate::types::Document;
use crate::{FolioError, Result};
use std::path::Path;
#[cfg(feature = "tokio-runtime")]
use std::time::Duration;

#[cfg(feature = "pdf")]
use crate::core::config::ExtractionConfig;
#[cfg(feature = "pdf")]
use crate::plugins::OcrBackend;
#[cfg(feature = "pdf")]
use std::sync::Arc;

/// Extract a file synchronously with an extractor built from `config`.
#[cfg(feature = "pdf")]
pub fn extract_file_sync(
    path: impl AsRef<Path>,
    cache_key: Option<&str>,
    config: &ExtractionConfig,
    ocr_backend: Option<Arc<dyn OcrBackend>>,
) -> Result<Vec<Document>> {
    PdfExtractor::from_config(config, ocr_backend)?.extract(path, cache_key)
}

/// Extract a file on the blocking pool with an extractor built from `config`.
///
/// `config.timeout_secs` bounds the whole extraction. On timeout the blocking
/// task keeps running to completion in the background and its result is
/// discarded.
///
/// # Example
///
/// ```rust,no_run
/// use folio::core::config::ExtractionConfig;
/// use folio::core::extractor::extract_file;
///
/// # async fn example() -> folio::Result<()> {
/// let config = ExtractionConfig::default();
/// let documents = extract_file("document.pdf", None, &config, None).await?;
/// println!("{} pages", documents.len());
/// # Ok(())
/// # }
/// ```
#[cfg(all(feature = "pdf", feature = "tokio-runtime"))]
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display(), cache_key = cache_key))]
pub async fn extract_file(
    path: impl AsRef<Path>,
    cache_key: Option<&str>,
    config: &ExtractionConfig,
    ocr_backend: Option<Arc<dyn OcrBackend>>,
) -> Result<Vec<Document>> {
    let config = config.clone();
    let timeout = config.timeout();
    extract_file_with(
        move || PdfExtractor::from_config(&config, ocr_backend),
        path,
        cache_key,
        timeout,
    )
    .await
}

/// Extract a file on the blocking pool with an extractor produced by `build`.
///
/// The extractor is built on the blocking thread, so it does not need to be
/// `Send`.
#[cfg(feature = "tokio-runtime")]
pub async fn extract_file_with<F>(
    build: F,
    path: impl AsRef<Path>,
    cache_key: Option<&str>,
    timeout: Option<Duration>,
) -> Result<Vec<Document>>
where
    F: FnOnce() -> Result<PdfExtractor> + Send + 'static,
{
    let path = path.as_ref().to_path_buf();
    let cache_key = cache_key.map(str::to_string);

    let task = tokio::task::spawn_blocking(move || build()?.extract(&path, cache_key.as_deref()));

    let joined = match timeout {
        Some(limit) => tokio::time::timeout(limit, task)
            .await
            .map_err(|_| FolioError::Other(format!("Extraction timed out after {}s", limit.as_secs_f64())))?,
        None => task.await,
    };

    joined.map_err(|join_err| FolioError::Other(format!("Extraction task panicked: {}", join_err)))?
}
