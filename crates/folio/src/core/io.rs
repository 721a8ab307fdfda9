//! File I/O utilities.
//!
//! I/O errors are never rewrapped here; they bubble up as `FolioError::Io`.

use crate::{FolioError, Result};
use std::fs;
use std::path::Path;

/// Read a file synchronously.
pub fn read_file_sync(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    fs::read(path.as_ref()).map_err(FolioError::Io)
}

/// Write `data` to `path` through a sibling temp file and a rename, so readers
/// never observe a partially written file.
pub fn write_file_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| FolioError::validation(format!("Invalid target path: {}", path.display())))?;

    let pid = std::process::id();
    let thread_id = std::thread::current().id();
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let temp_path = path.with_file_name(format!("{}.tmp.{}.{:?}.{}", file_name, pid, thread_id, timestamp));

    fs::write(&temp_path, data)?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        FolioError::Io(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_file_sync_missing() {
        let err = read_file_sync("/nonexistent/folio/file.pdf").unwrap_err();
        assert!(matches!(err, FolioError::Io(_)));
    }

    #[test]
    fn test_write_file_atomic_replaces_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entry.txt");

        write_file_atomic(&path, b"first").unwrap();
        write_file_atomic(&path, b"second").unwrap();

        assert_eq!(read_file_sync(&path).unwrap(), b"second");
        let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().flatten().collect();
        assert_eq!(leftovers.len(), 1);
    }
}
