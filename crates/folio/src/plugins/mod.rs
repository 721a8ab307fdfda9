//! Plugin traits for swappable collaborators.
//!
//! The OCR engine is the only heavy collaborator exposed as a plugin. It is
//! passed to the extractor as an `Arc<dyn OcrBackend>` at composition time.

mod ocr;
mod traits;

pub use ocr::OcrBackend;
pub use traits::Plugin;
