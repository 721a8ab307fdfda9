//! Native text layer extraction through pdfium.

use super::backend::{NativeDocument, TextExtractionBackend};
use super::bindings::bind_pdfium;
use super::error::{PdfError, Result};
use pdfium_render::prelude::*;

pub struct PdfiumTextBackend {
    pdfium: Pdfium,
}

impl PdfiumTextBackend {
    pub fn new() -> Result<Self> {
        let binding = bind_pdfium(PdfError::TextExtractionFailed, "text extraction")?;

        let pdfium = Pdfium::new(binding);
        Ok(Self { pdfium })
    }
}

impl TextExtractionBackend for PdfiumTextBackend {
    fn open<'a>(&'a self, pdf_bytes: &'a [u8]) -> Result<Box<dyn NativeDocument + 'a>> {
        let document = load_document(&self.pdfium, pdf_bytes)?;
        Ok(Box::new(PdfiumDocument { document }))
    }

    fn name(&self) -> &str {
        "pdfium"
    }
}

pub(crate) fn load_document<'a>(pdfium: &'a Pdfium, pdf_bytes: &'a [u8]) -> Result<PdfDocument<'a>> {
    pdfium.load_pdf_from_byte_slice(pdf_bytes, None).map_err(|e| {
        let err_msg = e.to_string();
        if err_msg.contains("password") || err_msg.contains("Password") {
            PdfError::PasswordRequired
        } else {
            PdfError::InvalidPdf(err_msg)
        }
    })
}

struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl NativeDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_text(&self, page_index: usize) -> Result<String> {
        let index = u16::try_from(page_index).map_err(|_| PdfError::PageNotFound(page_index))?;
        let page = self
            .document
            .pages()
            .get(index)
            .map_err(|_| PdfError::PageNotFound(page_index))?;

        // Both handles are dropped at the end of this call on every path.
        let text = page
            .text()
            .map_err(|e| PdfError::TextExtractionFailed(format!("Failed to open text layer: {}", e)))?;
        Ok(text.all())
    }
}
