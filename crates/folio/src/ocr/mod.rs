//! OCR fallback subsystem.
//!
//! [`OcrFallback`] rasterizes one page at a time through a
//! [`PageRasterizer`](crate::pdf::PageRasterizer) and hands the image to an
//! [`OcrBackend`](crate::plugins::OcrBackend). With the `tesseract` feature the
//! crate ships [`TesseractBackend`]; any other engine plugs in through the same
//! trait.
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(all(feature = "pdf", feature = "tesseract"))]
//! # fn example() -> folio::Result<()> {
//! use folio::blob::Blob;
//! use folio::core::config::OcrConfig;
//! use folio::ocr::{OcrFallback, TesseractBackend};
//! use folio::pdf::{PageRenderOptions, PdfiumRasterizer};
//! use std::sync::Arc;
//!
//! let engine = OcrFallback::new(
//!     Arc::new(TesseractBackend::new()),
//!     Box::new(PdfiumRasterizer::new()?),
//!     OcrConfig::default(),
//!     PageRenderOptions::default(),
//! )?;
//! let text = engine.recover_text(&Blob::from_path("scanned.pdf"), 0, None)?;
//! println!("{}", text);
//! # Ok(())
//! # }
//! ```
pub mod fallback;
#[cfg(feature = "tesseract")]
pub mod tesseract_backend;
pub mod types;

pub use fallback::OcrFallback;
#[cfg(feature = "tesseract")]
pub use tesseract_backend::TesseractBackend;
pub use types::{ModelHandle, OcrModelSet, OcrPrediction, TextLine};
