//! Configuration, file I/O and the top-level entry points.
//!
//! # Example
//!
//! ```rust,no_run
//! use folio::core::config::ExtractionConfig;
//! use folio::core::extractor::extract_file;
//!
//! # async fn example() -> folio::Result<()> {
//! let config = ExtractionConfig::discover()?.unwrap_or_default();
//! let documents = extract_file("document.pdf", Some("document-v1"), &config, None).await?;
//! println!("{} documents", documents.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod extractor;
pub mod io;

pub use config::{CacheConfig, ExtractionConfig, ExtractionStrategy, OcrConfig};
