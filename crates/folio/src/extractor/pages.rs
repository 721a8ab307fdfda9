//! Page-by-page text extraction.

use crate::blob::Blob;
use crate::core::config::ExtractionStrategy;
use crate::ocr::OcrFallback;
use crate::pdf::{NativeDocument, PdfError, TextExtractionBackend};
use crate::types::Document;
use crate::{FolioError, Result};
use std::iter::FusedIterator;
use std::sync::Arc;

const PDF_MIME_TYPE: &str = "application/pdf";

/// Produces one [`Document`] per PDF page.
pub struct PageExtractor {
    backend: Box<dyn TextExtractionBackend>,
    ocr: Option<Arc<OcrFallback>>,
    strategy: ExtractionStrategy,
}

impl PageExtractor {
    /// # Errors
    ///
    /// `FolioError::Validation` when `strategy` is `OcrOnly` and no OCR engine is given.
    pub fn new(
        backend: Box<dyn TextExtractionBackend>,
        ocr: Option<Arc<OcrFallback>>,
        strategy: ExtractionStrategy,
    ) -> Result<Self> {
        if strategy == ExtractionStrategy::OcrOnly && ocr.is_none() {
            return Err(FolioError::validation(
                "The ocr_only strategy requires an OCR engine",
            ));
        }
        Ok(Self {
            backend,
            ocr,
            strategy,
        })
    }

    pub fn strategy(&self) -> ExtractionStrategy {
        self.strategy
    }

    pub fn ocr(&self) -> Option<&Arc<OcrFallback>> {
        self.ocr.as_ref()
    }

    /// Open `blob` and return a lazy sequence of page documents.
    ///
    /// Nothing is extracted until the iterator is advanced. Each call starts a
    /// fresh pass over the document.
    ///
    /// # Errors
    ///
    /// `FolioError::UnsupportedFormat` if the bytes are not a PDF or the backend
    /// cannot parse them. The iterator itself yields an `Err` for the first page
    /// that fails and then stops.
    pub fn parse<'a>(&'a self, blob: &'a Blob) -> Result<PageIter<'a>> {
        let bytes = blob.as_bytes()?;
        ensure_pdf(bytes)?;

        let document = self.backend.open(bytes).map_err(|e| match e {
            PdfError::InvalidPdf(msg) => FolioError::UnsupportedFormat(format!("{}: {}", blob.source(), msg)),
            other => other.into(),
        })?;
        let page_count = document.page_count();
        tracing::debug!(
            source = blob.source(),
            backend = self.backend.name(),
            page_count,
            "Opened PDF"
        );

        Ok(PageIter {
            extractor: self,
            blob,
            document,
            page_count,
            next_page: 0,
            failed: false,
        })
    }

    fn extract_page(&self, document: &dyn NativeDocument, blob: &Blob, page_index: usize) -> Result<Document> {
        let content = match (self.strategy, &self.ocr) {
            (ExtractionStrategy::OcrOnly, Some(ocr)) => ocr.recover_text(blob, page_index, None)?,
            (ExtractionStrategy::OcrOnly, None) => {
                return Err(FolioError::validation("The ocr_only strategy requires an OCR engine"));
            }
            (ExtractionStrategy::Standard, ocr) => {
                let text = document.page_text(page_index)?;
                if !text.trim().is_empty() {
                    text
                } else if let Some(ocr) = ocr {
                    tracing::warn!(
                        source = blob.source(),
                        page = page_index,
                        "Page has no extractable text, falling back to OCR"
                    );
                    ocr.recover_text(blob, page_index, None)?
                } else {
                    tracing::warn!(
                        source = blob.source(),
                        page = page_index,
                        "Page has no extractable text and OCR is disabled"
                    );
                    text
                }
            }
        };

        Ok(Document::for_page(content, blob.source(), page_index))
    }
}

fn ensure_pdf(bytes: &[u8]) -> Result<()> {
    match infer::get(bytes) {
        Some(kind) if kind.mime_type() == PDF_MIME_TYPE => Ok(()),
        Some(kind) => Err(FolioError::UnsupportedFormat(kind.mime_type().to_string())),
        None if bytes.is_empty() => Err(FolioError::UnsupportedFormat("empty input".to_string())),
        None => Err(FolioError::UnsupportedFormat("unrecognized content".to_string())),
    }
}

/// Lazy sequence of page documents, in page order.
///
/// The page-level text handles of each page are released before the page's
/// document is yielded. After the first error the iterator is exhausted.
pub struct PageIter<'a> {
    extractor: &'a PageExtractor,
    blob: &'a Blob,
    document: Box<dyn NativeDocument + 'a>,
    page_count: usize,
    next_page: usize,
    failed: bool,
}

impl PageIter<'_> {
    pub fn page_count(&self) -> usize {
        self.page_count
    }
}

impl Iterator for PageIter<'_> {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.next_page >= self.page_count {
            return None;
        }

        let page_index = self.next_page;
        self.next_page += 1;

        let result = self
            .extractor
            .extract_page(self.document.as_ref(), self.blob, page_index);
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        (0, Some(self.page_count - self.next_page))
    }
}

impl FusedIterator for PageIter<'_> {}
