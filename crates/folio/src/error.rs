//! Error types for folio.
//!
//! All fallible operations return [`FolioError`] through the crate-wide [`Result`]
//! alias.
//!
//! # Error Handling Philosophy
//!
//! **Only a cache miss is recoverable.** [`FolioError::CacheMiss`] is produced by
//! [`PlaintextStore::load`](crate::cache::PlaintextStore::load) when a key is absent
//! and the extraction orchestrator swallows it to fall through to full extraction.
//!
//! **Everything else propagates:**
//! - `Io` - file system errors bubble up unchanged
//! - `UnsupportedFormat` - the input is not a PDF, no pages are produced
//! - `Parsing` - the PDF backend could not open or read the document
//! - `Ocr` - rasterization, model loading or recognition failed for a blank page
//!
//! An extraction that hits any of these returns no documents at all, so a
//! truncated page list can never reach a downstream chunker.
use thiserror::Error;

/// Result type alias using `FolioError`.
pub type Result<T> = std::result::Result<T, FolioError>;

/// Main error type for all folio operations.
#[derive(Debug, Error)]
pub enum FolioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache miss for key '{key}'")]
    CacheMiss { key: String },

    #[error("Parsing error: {message}")]
    Parsing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("OCR error: {message}")]
    Ocr {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Cache error: {message}")]
    Cache {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Other(String),
}

impl From<crate::pdf::error::PdfError> for FolioError {
    fn from(err: crate::pdf::error::PdfError) -> Self {
        FolioError::Parsing {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl FolioError {
    error_constructor!(ocr, Ocr);
    error_constructor!(validation, Validation);
    error_constructor!(cache, Cache);

    pub fn cache_miss<S: Into<String>>(key: S) -> Self {
        Self::CacheMiss { key: key.into() }
    }

    /// True for the one error kind the orchestrator recovers from.
    pub fn is_cache_miss(&self) -> bool {
        matches!(self, Self::CacheMiss { .. })
    }
}
