//! File system utilities for packaging.
//!
//! Idempotent removal for cleanup, plus size and checksum helpers for the
//! artifact summary.

use crate::bundler::error::{ErrorExt, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Outcome of removing one path.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Removal {
    /// The path existed and was removed.
    Removed,
    /// Nothing was there; no filesystem mutation happened.
    Absent,
}

/// Removes a file or directory tree if it exists.
///
/// Symlinks are removed, never followed.
pub fn remove_path(path: &Path) -> Result<Removal> {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Removal::Absent),
        Err(e) => return Err(e).fs_context("inspecting", path),
    };

    if metadata.is_dir() {
        std::fs::remove_dir_all(path).fs_context("removing directory", path)?;
    } else {
        std::fs::remove_file(path).fs_context("removing file", path)?;
    }
    Ok(Removal::Removed)
}

/// Sums the size of every file below `path`.
pub fn dir_size(path: &Path) -> Result<u64> {
    let mut total = 0u64;
    for entry in walkdir::WalkDir::new(path) {
        let entry = entry.map_err(|e| {
            let error = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory loop detected"));
            crate::bundler::Error::Fs {
                context: "walking artifact directory",
                path: path.to_path_buf(),
                error,
            }
        })?;
        if entry.file_type().is_file() {
            total += entry
                .metadata()
                .map_err(|e| crate::bundler::Error::GenericError(e.to_string()))?
                .len();
        }
    }
    Ok(total)
}

/// Hex-encoded SHA-256 of a file, read in 8KB chunks.
pub async fn sha256_file(path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(path)
        .await
        .fs_context("opening artifact", path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading artifact", path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_remove_path_idempotent() {
        let dir = TempDir::new().unwrap();
        let tree = dir.path().join("build");
        std::fs::create_dir_all(tree.join("nested")).unwrap();
        std::fs::write(tree.join("nested/file"), b"x").unwrap();

        assert_eq!(remove_path(&tree).unwrap(), Removal::Removed);
        assert!(!tree.exists());
        assert_eq!(remove_path(&tree).unwrap(), Removal::Absent);
    }

    #[test]
    fn test_dir_size() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("a"), b"1234").unwrap();
        std::fs::write(dir.path().join("sub/b"), b"56").unwrap();
        assert_eq!(dir_size(dir.path()).unwrap(), 6);
    }
}
