//! OCR model collaborator trait.
//!
//! An `OcrBackend` owns the heavy OCR library. Model loading is split into the
//! three calls the fallback engine memoizes, and `run_ocr` receives the loaded
//! [`OcrModelSet`] explicitly instead of reaching for global state.

use crate::Result;
use crate::ocr::types::{ModelHandle, OcrModelSet, OcrPrediction};
use crate::plugins::Plugin;
use image::DynamicImage;
use std::path::Path;

pub trait OcrBackend: Plugin {
    /// Load the text-detection model from `path`.
    fn load_detection_model(&self, path: &Path) -> Result<ModelHandle>;

    fn load_recognition_model(&self) -> Result<ModelHandle>;

    fn load_recognition_processor(&self) -> Result<ModelHandle>;

    /// Detect and recognize text in each image.
    ///
    /// Returns one prediction per input image, lines in reading order.
    fn run_ocr(&self, images: &[DynamicImage], languages: &[String], models: &OcrModelSet)
    -> Result<Vec<OcrPrediction>>;

    fn supports_language(&self, _lang: &str) -> bool {
        true
    }

    /// Load all three models in order.
    fn load_models(&self, detection_model_path: &Path) -> Result<OcrModelSet> {
        let detection = self.load_detection_model(detection_model_path)?;
        let recognition = self.load_recognition_model()?;
        let recognition_processor = self.load_recognition_processor()?;
        Ok(OcrModelSet::new(detection, recognition, recognition_processor))
    }
}
