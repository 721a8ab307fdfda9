//! Capability traits for the heavy PDF libraries.
//!
//! The page extractor and the OCR fallback engine only see these traits. The
//! pdfium implementations in [`text`](super::text) and [`rendering`](super::rendering)
//! are wired in at composition time, which keeps the pipeline testable without a
//! native pdfium library.

use super::error::Result;
use super::rendering::PageRenderOptions;
use image::DynamicImage;

/// Opens a PDF for native text extraction.
pub trait TextExtractionBackend {
    /// Open `pdf_bytes` as a document. The returned handle borrows both the
    /// backend and the bytes, and is released when dropped.
    fn open<'a>(&'a self, pdf_bytes: &'a [u8]) -> Result<Box<dyn NativeDocument + 'a>>;

    /// Short identifier used in logs.
    fn name(&self) -> &str;
}

/// An opened document whose pages can be read one at a time.
pub trait NativeDocument {
    fn page_count(&self) -> usize;

    /// Full text range of the 0-indexed page.
    ///
    /// Implementations must acquire and release all page-level handles inside
    /// this call, whether or not extraction succeeds.
    fn page_text(&self, page_index: usize) -> Result<String>;
}

/// Renders PDF pages to images for OCR.
pub trait PageRasterizer {
    /// Render the inclusive, 1-indexed page range `first_page..=last_page`.
    fn render_pages(
        &self,
        pdf_bytes: &[u8],
        first_page: usize,
        last_page: usize,
        options: &PageRenderOptions,
    ) -> Result<Vec<DynamicImage>>;
}
