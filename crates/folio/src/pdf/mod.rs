//! PDF access: native text layer and page rasterization.
//!
//! The pipeline depends only on the traits in [`backend`]. With the `pdf`
//! feature enabled, [`PdfiumTextBackend`] and [`PdfiumRasterizer`] implement
//! them on top of `pdfium-render`. The pdfium library is bound lazily on first
//! use; set `FOLIO_PDFIUM_DIR` to bind a library outside the system search path.
//!
//! # Example
//!
//! ```rust,no_run
//! use folio::pdf::{NativeDocument, PdfiumTextBackend, TextExtractionBackend};
//!
//! # fn example() -> folio::Result<()> {
//! let pdf_bytes = std::fs::read("document.pdf")?;
//! let backend = PdfiumTextBackend::new()?;
//! let document = backend.open(&pdf_bytes)?;
//! for page_index in 0..document.page_count() {
//!     println!("{}", document.page_text(page_index)?);
//! }
//! # Ok(())
//! # }
//! ```
pub mod backend;
#[cfg(feature = "pdf")]
pub mod bindings;
pub mod error;
pub mod rendering;
#[cfg(feature = "pdf")]
pub mod text;

pub use backend::{NativeDocument, PageRasterizer, TextExtractionBackend};
pub use error::PdfError;
pub use rendering::PageRenderOptions;

#[cfg(feature = "pdf")]
pub use rendering::PdfiumRasterizer;
#[cfg(feature = "pdf")]
pub use text::PdfiumTextBackend;
