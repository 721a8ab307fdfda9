//! Tesseract-backed [`OcrBackend`].
//!
//! Tesseract has no separate detection network, so the three model handles
//! map onto its own setup steps: the detection handle is the tessdata
//! directory, the recognition handle records the engine version and the
//! processor handle holds the page segmentation mode.

use crate::ocr::types::{ModelHandle, OcrModelSet, OcrPrediction, handle_as};
use crate::plugins::{OcrBackend, Plugin};
use crate::{FolioError, Result};
use image::DynamicImage;
use kreuzberg_tesseract::{TessPageSegMode, TesseractAPI};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const FALLBACK_TESSDATA_PATHS: &[&str] = &[
    "/opt/homebrew/share/tessdata",
    "/opt/homebrew/opt/tesseract/share/tessdata",
    "/usr/local/opt/tesseract/share/tessdata",
    "/usr/share/tesseract-ocr/5/tessdata",
    "/usr/share/tesseract-ocr/4/tessdata",
    "/usr/share/tessdata",
    "/usr/local/share/tessdata",
];

/// Fully automatic page segmentation, no OSD.
const DEFAULT_PSM: i32 = 3;

#[derive(Debug, Clone)]
struct Tessdata(PathBuf);

#[derive(Debug, Clone)]
struct RecognitionEngine {
    version: String,
}

#[derive(Debug, Clone, Copy)]
struct Segmentation {
    psm: i32,
}

pub struct TesseractBackend {
    psm: i32,
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self { psm: DEFAULT_PSM }
    }
}

impl TesseractBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_seg_mode(psm: i32) -> Self {
        Self { psm }
    }
}

/// Map a short language code to Tesseract traineddata names.
pub fn tesseract_language(code: &str) -> &str {
    match code.to_ascii_lowercase().as_str() {
        "zh" | "zh-cn" | "zh-hans" | "ch" => "chi_sim",
        "zh-tw" | "zh-hant" | "chinese_cht" => "chi_tra",
        "en" => "eng",
        "de" => "deu",
        "fr" => "fra",
        "ja" | "japan" => "jpn",
        "ko" | "korean" => "kor",
        _ => code,
    }
}

fn resolve_tessdata(path: &Path) -> Option<PathBuf> {
    if path.is_dir() {
        return Some(path.to_path_buf());
    }
    std::env::var_os("TESSDATA_PREFIX")
        .map(PathBuf::from)
        .filter(|p| p.is_dir())
        .or_else(|| {
            FALLBACK_TESSDATA_PATHS
                .iter()
                .map(PathBuf::from)
                .find(|p| p.is_dir())
        })
}

fn recognize(
    image: &DynamicImage,
    tessdata: &Path,
    language: &str,
    psm: i32,
) -> Result<OcrPrediction> {
    let rgb_image = image.to_rgb8();
    let (width, height) = rgb_image.dimensions();
    let bytes_per_pixel = 3;
    let bytes_per_line = width * bytes_per_pixel;

    let tessdata_str = tessdata
        .to_str()
        .ok_or_else(|| FolioError::ocr(format!("Tessdata path is not valid UTF-8: {}", tessdata.display())))?;

    let api = TesseractAPI::new();
    api.init(tessdata_str, language)
        .map_err(|e| FolioError::ocr(format!("Failed to initialize language '{}': {}", language, e)))?;
    api.set_page_seg_mode(TessPageSegMode::from_int(psm))
        .map_err(|e| FolioError::ocr(format!("Failed to set PSM mode: {}", e)))?;
    api.set_image(
        rgb_image.as_raw(),
        width as i32,
        height as i32,
        bytes_per_pixel as i32,
        bytes_per_line as i32,
    )
    .map_err(|e| FolioError::ocr(format!("Failed to set image: {}", e)))?;
    api.recognize()
        .map_err(|e| FolioError::ocr(format!("Failed to recognize text: {}", e)))?;

    let text = api
        .get_utf8_text()
        .map_err(|e| FolioError::ocr(format!("Failed to extract text: {}", e)))?;

    Ok(OcrPrediction::from_lines(
        text.lines().map(str::trim_end).filter(|line| !line.trim().is_empty()),
    ))
}

impl Plugin for TesseractBackend {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn version(&self) -> String {
        TesseractAPI::version().to_string()
    }

    fn initialize(&self) -> Result<()> {
        Ok(())
    }
}

impl OcrBackend for TesseractBackend {
    fn load_detection_model(&self, path: &Path) -> Result<ModelHandle> {
        let tessdata = resolve_tessdata(path).ok_or_else(|| {
            FolioError::ocr(format!(
                "No tessdata directory at '{}', TESSDATA_PREFIX or the system defaults",
                path.display()
            ))
        })?;
        tracing::debug!(tessdata = %tessdata.display(), "Resolved tessdata directory");
        Ok(Arc::new(Tessdata(tessdata)))
    }

    fn load_recognition_model(&self) -> Result<ModelHandle> {
        Ok(Arc::new(RecognitionEngine {
            version: TesseractAPI::version().to_string(),
        }))
    }

    fn load_recognition_processor(&self) -> Result<ModelHandle> {
        Ok(Arc::new(Segmentation { psm: self.psm }))
    }

    fn run_ocr(
        &self,
        images: &[DynamicImage],
        languages: &[String],
        models: &OcrModelSet,
    ) -> Result<Vec<OcrPrediction>> {
        let Tessdata(tessdata) = handle_as::<Tessdata>(&models.detection, "detection")?;
        let engine = handle_as::<RecognitionEngine>(&models.recognition, "recognition")?;
        let segmentation = handle_as::<Segmentation>(&models.recognition_processor, "recognition processor")?;

        let traineddata: Vec<&str> = languages.iter().map(|lang| tesseract_language(lang)).collect();
        for name in &traineddata {
            // A missing traineddata file crashes tesseract instead of failing init.
            let file = tessdata.join(format!("{}.traineddata", name));
            if !file.exists() {
                return Err(FolioError::ocr(format!(
                    "Language '{}' not found. Traineddata file does not exist: {}",
                    name,
                    file.display()
                )));
            }
        }
        let language = traineddata.join("+");

        tracing::debug!(version = %engine.version, language = %language, images = images.len(), "Running tesseract");
        images
            .iter()
            .map(|image| recognize(image, tessdata, &language, segmentation.psm))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_mapping() {
        assert_eq!(tesseract_language("zh"), "chi_sim");
        assert_eq!(tesseract_language("zh-TW"), "chi_tra");
        assert_eq!(tesseract_language("en"), "eng");
        assert_eq!(tesseract_language("ja"), "jpn");
        assert_eq!(tesseract_language("ita"), "ita");
    }

    #[test]
    fn test_missing_traineddata_is_ocr_error() {
        let dir = tempfile::tempdir().unwrap();
        let backend = TesseractBackend::new();
        let models = backend.load_models(dir.path()).unwrap();

        let image = DynamicImage::ImageRgb8(image::RgbImage::new(8, 8));
        let err = backend.run_ocr(&[image], &["zh".to_string()], &models).unwrap_err();
        assert!(matches!(err, FolioError::Ocr { .. }));
        assert!(err.to_string().contains("chi_sim"));
    }
}
