//! OCR fallback for pages without a native text layer.

use crate::blob::Blob;
use crate::core::config::OcrConfig;
use crate::ocr::types::{OcrModelSet, OcrPrediction};
use crate::pdf::{PageRasterizer, PageRenderOptions};
use crate::plugins::OcrBackend;
use crate::{FolioError, Result};
use image::DynamicImage;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

/// Rasterizes a single page and recovers its text with an [`OcrBackend`].
///
/// Models are loaded once per engine, on the first page that needs them, and
/// reused for every later call. Pre-loaded models can be injected with
/// [`OcrFallback::with_models`] to share them between engines.
pub struct OcrFallback {
    backend: Arc<dyn OcrBackend>,
    rasterizer: Box<dyn PageRasterizer>,
    config: OcrConfig,
    render: PageRenderOptions,
    models: OnceCell<Arc<OcrModelSet>>,
}

impl OcrFallback {
    pub fn new(
        backend: Arc<dyn OcrBackend>,
        rasterizer: Box<dyn PageRasterizer>,
        config: OcrConfig,
        render: PageRenderOptions,
    ) -> Result<Self> {
        if config.languages.is_empty() {
            return Err(FolioError::validation("OCR languages must not be empty"));
        }
        if let Some(lang) = config.languages.iter().find(|lang| !backend.supports_language(lang)) {
            return Err(FolioError::validation(format!(
                "OCR backend '{}' does not support language '{}'",
                backend.name(),
                lang
            )));
        }
        backend.initialize()?;
        tracing::debug!(
            backend = backend.name(),
            version = %backend.version(),
            languages = ?config.languages,
            "OCR fallback ready"
        );

        Ok(Self {
            backend,
            rasterizer,
            config,
            render,
            models: OnceCell::new(),
        })
    }

    /// Use already loaded models instead of loading them on first use.
    pub fn with_models(mut self, models: Arc<OcrModelSet>) -> Self {
        self.models = OnceCell::with_value(models);
        self
    }

    pub fn backend(&self) -> &Arc<dyn OcrBackend> {
        &self.backend
    }

    pub fn languages(&self) -> &[String] {
        &self.config.languages
    }

    /// The loaded model set, loading it on first call.
    pub fn models(&self) -> Result<Arc<OcrModelSet>> {
        self.models
            .get_or_try_init(|| {
                let detection_path = self.config.detection_model_path()?;
                tracing::debug!(
                    backend = self.backend.name(),
                    path = %detection_path.display(),
                    "Loading OCR models"
                );
                self.backend
                    .load_models(&detection_path)
                    .map(Arc::new)
                    .map_err(|e| into_ocr_error("Failed to load OCR models", e))
            })
            .cloned()
    }

    /// Recover the text of the 0-indexed `page_index` of `blob`.
    ///
    /// `languages` defaults to the configured language set.
    ///
    /// # Errors
    ///
    /// Rasterization, model loading and recognition failures are returned as
    /// `FolioError::Ocr`. They are never turned into empty text.
    #[tracing::instrument(skip_all, fields(source = blob.source(), page = page_index))]
    pub fn recover_text(&self, blob: &Blob, page_index: usize, languages: Option<&[String]>) -> Result<String> {
        let languages = languages.unwrap_or(&self.config.languages[..]);
        let page_number = page_index + 1;

        let images = self
            .rasterizer
            .render_pages(blob.as_bytes()?, page_number, page_number, &self.render)
            .map_err(|e| FolioError::ocr_with_source(format!("Failed to rasterize page {}", page_index), e))?;

        if images.len() != 1 {
            return Err(FolioError::ocr(format!(
                "Expected one rendered image for page {}, got {}",
                page_index,
                images.len()
            )));
        }
        let images: Vec<DynamicImage> = images
            .into_iter()
            .map(|image| DynamicImage::ImageRgb8(image.into_rgb8()))
            .collect();

        let models = self.models()?;
        let predictions = self
            .run_ocr(images, languages.to_vec(), models)
            .map_err(|e| into_ocr_error("OCR failed", e))?;

        let prediction = predictions
            .into_iter()
            .next()
            .ok_or_else(|| FolioError::ocr(format!("OCR returned no prediction for page {}", page_index)))?;

        tracing::debug!(lines = prediction.text_lines.len(), "OCR recovered page text");
        Ok(prediction.text())
    }

    fn run_ocr(
        &self,
        images: Vec<DynamicImage>,
        languages: Vec<String>,
        models: Arc<OcrModelSet>,
    ) -> Result<Vec<OcrPrediction>> {
        let Some(timeout) = self.config.timeout() else {
            return self.backend.run_ocr(&images, &languages, &models);
        };

        let backend = Arc::clone(&self.backend);
        let (tx, rx) = mpsc::channel();
        std::thread::Builder::new()
            .name("folio-ocr".to_string())
            .spawn(move || {
                let _ = tx.send(backend.run_ocr(&images, &languages, &models));
            })
            .map_err(|e| FolioError::ocr_with_source("Failed to spawn OCR worker", e))?;

        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(FolioError::ocr(format!(
                "OCR timed out after {}",
                format_duration(timeout)
            ))),
            Err(RecvTimeoutError::Disconnected) => Err(FolioError::ocr("OCR worker exited without a result")),
        }
    }
}

fn format_duration(duration: Duration) -> String {
    if duration.subsec_millis() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

fn into_ocr_error(context: &str, err: FolioError) -> FolioError {
    match err {
        FolioError::Ocr { .. } => err,
        other => FolioError::ocr_with_source(context, other),
    }
}
