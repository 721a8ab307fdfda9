use std::fmt;

#[derive(Debug, Clone)]
pub enum PdfError {
    InvalidPdf(String),
    PasswordRequired,
    PageNotFound(usize),
    InvalidPageRange { first: usize, last: usize },
    TextExtractionFailed(String),
    RenderingFailed(String),
    BindingFailed(String),
}

impl fmt::Display for PdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfError::InvalidPdf(msg) => write!(f, "Invalid PDF: {}", msg),
            PdfError::PasswordRequired => write!(f, "PDF is password-protected"),
            PdfError::PageNotFound(page) => write!(f, "Page {} not found", page),
            PdfError::InvalidPageRange { first, last } => {
                write!(f, "Invalid page range {}..={} (pages are 1-indexed)", first, last)
            }
            PdfError::TextExtractionFailed(msg) => write!(f, "Text extraction failed: {}", msg),
            PdfError::RenderingFailed(msg) => write!(f, "Page rendering failed: {}", msg),
            PdfError::BindingFailed(msg) => write!(f, "Pdfium binding failed: {}", msg),
        }
    }
}

impl std::error::Error for PdfError {}

// No From<std::io::Error>: IO errors stay FolioError::Io.

pub type Result<T> = std::result::Result<T, PdfError>;
