//! Byte-addressable document input.

use crate::Result;
use crate::core::io::read_file_sync;
use once_cell::sync::OnceCell;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Immutable reference to document bytes plus a stable source identifier.
///
/// Path-backed blobs read the file on first access and keep the bytes for
/// every later reader, so the blob can be re-opened as a stream any number of
/// times.
#[derive(Debug)]
pub struct Blob {
    source: String,
    path: Option<PathBuf>,
    data: OnceCell<Vec<u8>>,
}

impl Blob {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            source: path.to_string_lossy().into_owned(),
            path: Some(path),
            data: OnceCell::new(),
        }
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>, source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            path: None,
            data: OnceCell::with_value(bytes.into()),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Raw bytes, loading them from disk on first use.
    pub fn as_bytes(&self) -> Result<&[u8]> {
        let bytes = self.data.get_or_try_init(|| match &self.path {
            Some(path) => read_file_sync(path),
            None => Ok(Vec::new()),
        })?;
        Ok(bytes.as_slice())
    }

    /// A fresh seekable stream over the bytes.
    pub fn as_reader(&self) -> Result<Cursor<&[u8]>> {
        Ok(Cursor::new(self.as_bytes()?))
    }
}
