//! Cache-aware PDF extraction.
//!
//! [`PdfExtractor`] is the top-level entry point. A lookup in the plaintext
//! cache short-circuits the whole pipeline; on a miss the pages are extracted
//! through [`PageExtractor`] and the concatenated text is written back under
//! the same key.
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(feature = "pdf")]
//! # fn example() -> folio::Result<()> {
//! use folio::core::config::{CacheConfig, ExtractionConfig};
//! use folio::extractor::PdfExtractor;
//!
//! let config = ExtractionConfig {
//!     ocr: None,
//!     cache: Some(CacheConfig::default()),
//!     ..Default::default()
//! };
//! let extractor = PdfExtractor::from_config(&config, None)?;
//! for document in extractor.extract("report.pdf", Some("report-v1"))? {
//!     println!("{:?}: {}", document.page(), document.page_content());
//! }
//! # Ok(())
//! # }
//! ```
pub mod pages;

pub use pages::{PageExtractor, PageIter};

use crate::blob::Blob;
use crate::cache::PlaintextStore;
use crate::types::Document;
use crate::{FolioError, Result};
use std::path::Path;
use std::sync::Arc;

/// Separator between page texts in a cached full-document entry.
pub const PAGE_SEPARATOR: &str = "\n\n";

pub struct PdfExtractor {
    pages: PageExtractor,
    store: Option<Arc<dyn PlaintextStore>>,
    write_back: bool,
}

impl PdfExtractor {
    /// An extractor without a plaintext cache.
    pub fn new(pages: PageExtractor) -> Self {
        Self {
            pages,
            store: None,
            write_back: false,
        }
    }

    /// Attach a plaintext cache. With `write_back`, text extracted after a miss
    /// is stored under the same key.
    pub fn with_store(mut self, store: Arc<dyn PlaintextStore>, write_back: bool) -> Self {
        self.store = Some(store);
        self.write_back = write_back;
        self
    }

    /// Build an extractor wired to pdfium from configuration.
    ///
    /// `ocr_backend` supplies the OCR engine. Blank pages are kept as-is only
    /// when OCR is disabled in `config`.
    ///
    /// # Errors
    ///
    /// `FolioError::Validation` when OCR is enabled in `config` but no
    /// `ocr_backend` is given.
    #[cfg(feature = "pdf")]
    pub fn from_config(
        config: &crate::core::config::ExtractionConfig,
        ocr_backend: Option<Arc<dyn crate::plugins::OcrBackend>>,
    ) -> Result<Self> {
        use crate::cache::FsPlaintextStore;
        use crate::ocr::OcrFallback;
        use crate::pdf::{PdfiumRasterizer, PdfiumTextBackend};

        config.validate()?;

        let ocr = match (config.ocr_config(), ocr_backend) {
            (Some(ocr_config), Some(backend)) => Some(Arc::new(OcrFallback::new(
                backend,
                Box::new(PdfiumRasterizer::new()?),
                ocr_config.clone(),
                config.render.clone(),
            )?)),
            (Some(_), None) => {
                return Err(FolioError::validation(
                    "OCR is enabled but no OCR backend was supplied; disable OCR to keep blank pages as-is",
                ));
            }
            (None, backend) => {
                if backend.is_some() {
                    tracing::debug!("OCR is disabled, ignoring the supplied OCR backend");
                }
                None
            }
        };

        let pages = PageExtractor::new(Box::new(PdfiumTextBackend::new()?), ocr, config.strategy)?;
        let mut extractor = Self::new(pages);

        if let Some(cache) = &config.cache {
            let store = FsPlaintextStore::new(cache.resolved_dir()?, cache.max_age_days)?;
            extractor = extractor.with_store(Arc::new(store), cache.write_back);
        }

        Ok(extractor)
    }

    /// Extract the PDF at `path`.
    ///
    /// With a `cache_key` and a populated cache entry this returns a single
    /// document holding the cached text and no metadata, without opening the
    /// file. Otherwise it returns one document per page, in page order.
    ///
    /// # Errors
    ///
    /// Every failure except a cache miss is returned, and a failed page means
    /// no documents are returned at all.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display(), cache_key = cache_key))]
    pub fn extract(&self, path: impl AsRef<Path>, cache_key: Option<&str>) -> Result<Vec<Document>> {
        self.extract_blob(&Blob::from_path(path.as_ref()), cache_key)
    }

    /// Extract an in-memory PDF identified by `source`.
    #[tracing::instrument(skip_all, fields(source = source, cache_key = cache_key))]
    pub fn extract_bytes(&self, bytes: &[u8], source: &str, cache_key: Option<&str>) -> Result<Vec<Document>> {
        self.extract_blob(&Blob::from_bytes(bytes, source), cache_key)
    }

    pub fn extract_blob(&self, blob: &Blob, cache_key: Option<&str>) -> Result<Vec<Document>> {
        if let Some(key) = cache_key
            && let Some(text) = self.load_cached(key)?
        {
            return Ok(vec![Document::new(text)]);
        }

        let documents = self.pages.parse(blob)?.collect::<Result<Vec<_>>>()?;
        tracing::info!(source = blob.source(), pages = documents.len(), "Extracted PDF");

        // A zero-page document leaves nothing to cache; an empty entry would
        // come back as one empty document.
        if let Some(key) = cache_key
            && !documents.is_empty()
        {
            self.store_text(key, &documents);
        }

        Ok(documents)
    }

    /// Lazily iterate over the pages of `blob` without touching the cache.
    pub fn load<'a>(&'a self, blob: &'a Blob) -> Result<PageIter<'a>> {
        self.pages.parse(blob)
    }

    fn load_cached(&self, key: &str) -> Result<Option<String>> {
        let Some(store) = &self.store else {
            return Ok(None);
        };

        match store.load(key) {
            Ok(bytes) => {
                let text = String::from_utf8(bytes).map_err(|e| {
                    FolioError::cache_with_source(format!("Cached entry '{}' is not valid UTF-8", key), e)
                })?;
                tracing::debug!(key, bytes = text.len(), "Plaintext cache hit");
                Ok(Some(text))
            }
            Err(err) if err.is_cache_miss() => {
                tracing::debug!(key, "Plaintext cache miss");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn store_text(&self, key: &str, documents: &[Document]) {
        let Some(store) = self.store.as_ref().filter(|_| self.write_back) else {
            return;
        };

        let text = documents
            .iter()
            .map(Document::page_content)
            .collect::<Vec<_>>()
            .join(PAGE_SEPARATOR);

        match store.save(key, text.as_bytes()) {
            Ok(()) => tracing::debug!(key, bytes = text.len(), "Stored plaintext in cache"),
            Err(err) => tracing::warn!(key, error = %err, "Failed to write plaintext cache entry"),
        }
    }
}

#[cfg(all(test, feature = "pdf"))]
mod tests {
    use super::*;
    use crate::core::config::ExtractionConfig;

    #[test]
    fn test_from_config_requires_backend_when_ocr_enabled() {
        let config = ExtractionConfig::default();
        assert!(config.ocr_config().is_some());

        let err = PdfExtractor::from_config(&config, None).err().unwrap();
        assert!(matches!(err, FolioError::Validation { .. }));
        assert!(err.to_string().contains("no OCR backend"));
    }
}
