//! Folio - cache-aware PDF plaintext extraction
//!
//! Folio turns PDF documents into per-page [`Document`]s ready for chunking
//! and embedding. Native text extraction is tried first; pages that come back
//! blank are rasterized and recovered through an OCR engine. An optional
//! plaintext cache keyed by the caller short-circuits the whole pipeline.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! # #[cfg(feature = "pdf")]
//! # fn main() -> folio::Result<()> {
//! use folio::{ExtractionConfig, extract_file_sync};
//!
//! let config = ExtractionConfig::default();
//! let documents = extract_file_sync("document.pdf", None, &config, None)?;
//! for document in &documents {
//!     println!("page {:?}: {}", document.page(), document.page_content());
//! }
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "pdf"))]
//! # fn main() {}
//! ```
//!
//! # Architecture
//!
//! - **Blob** (`blob`): byte source with a stable identifier
//! - **PDF** (`pdf`): native text layer and page rasterization traits, pdfium implementations
//! - **OCR** (`ocr`, `plugins`): fallback engine and the pluggable OCR model collaborator
//! - **Cache** (`cache`): plaintext store contract with filesystem and in-memory stores
//! - **Extractor** (`extractor`): page iteration and cache-aware orchestration
//! - **Core** (`core`): configuration, I/O and async entry points

#![deny(unsafe_code)]

pub mod blob;
pub mod cache;
pub mod core;
pub mod error;
pub mod extractor;
pub mod ocr;
pub mod pdf;
pub mod plugins;
pub mod types;

pub use error::{FolioError, Result};
pub use types::{Document, Metadata};

pub use blob::Blob;
pub use cache::{FsPlaintextStore, MemoryPlaintextStore, PlaintextStore};
pub use core::config::{CacheConfig, ExtractionConfig, ExtractionStrategy, OcrConfig};
pub use extractor::{PageExtractor, PageIter, PdfExtractor};
pub use ocr::{OcrFallback, OcrModelSet, OcrPrediction};
pub use plugins::{OcrBackend, Plugin};

#[cfg(feature = "pdf")]
pub use core::extractor::extract_file_sync;

#[cfg(all(feature = "pdf", feature = "tokio-runtime"))]
pub use core::extractor::extract_file;
