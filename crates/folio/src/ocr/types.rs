use crate::{FolioError, Result};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;

/// Opaque loaded model. Each [`OcrBackend`](crate::plugins::OcrBackend) decides
/// what it stores here and downcasts it back in `run_ocr`.
pub type ModelHandle = Arc<dyn Any + Send + Sync>;

/// The detection model, recognition model and recognition processor handed to
/// `run_ocr` together.
#[derive(Clone)]
pub struct OcrModelSet {
    pub detection: ModelHandle,
    pub recognition: ModelHandle,
    pub recognition_processor: ModelHandle,
}

impl std::fmt::Debug for OcrModelSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrModelSet").finish_non_exhaustive()
    }
}

impl OcrModelSet {
    pub fn new(detection: ModelHandle, recognition: ModelHandle, recognition_processor: ModelHandle) -> Self {
        Self {
            detection,
            recognition,
            recognition_processor,
        }
    }
}

/// Downcast a model handle to the concrete type a backend stored in it.
pub fn handle_as<'a, T: Any>(handle: &'a ModelHandle, role: &str) -> Result<&'a T> {
    handle.downcast_ref::<T>().ok_or_else(|| {
        FolioError::ocr(format!(
            "{} model handle has unexpected type (expected {})",
            role,
            std::any::type_name::<T>()
        ))
    })
}

/// One recognized line of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    /// `[x_min, y_min, x_max, y_max]` in image pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f32; 4]>,
}

impl TextLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: None,
            bbox: None,
        }
    }
}

/// Recognized lines for one image, in the engine's reading order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrPrediction {
    pub text_lines: Vec<TextLine>,
}

impl OcrPrediction {
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            text_lines: lines.into_iter().map(TextLine::new).collect(),
        }
    }

    /// Lines joined with `\n`.
    pub fn text(&self) -> String {
        self.text_lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
