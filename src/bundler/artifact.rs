//! Artifact location and verification.
//!
//! A success status from the packaging tool is not trusted on its own: the
//! expected artifact must exist at its computed path before a run counts as
//! successful.

use crate::bundler::{BuildConfig, BuildMode, Error, ErrorExt, Result, utils::fs};
use std::path::{Path, PathBuf};

/// Directory the packaging tool writes artifacts into, relative to the project.
pub const DIST_DIR: &str = "dist";

/// Artifact path relative to the project directory.
///
/// - single-file: `dist/<name>` (`dist/<name>.exe` on Windows)
/// - directory: `dist/<name>/`
pub fn relative_path(config: &BuildConfig) -> PathBuf {
    let dist = Path::new(DIST_DIR);
    match config.mode() {
        BuildMode::SingleFile => dist.join(format!(
            "{}{}",
            config.executable_name(),
            config.platform().executable_suffix()
        )),
        BuildMode::Directory => dist.join(config.executable_name()),
    }
}

/// Artifact path resolved against the project directory.
pub fn expected_path(config: &BuildConfig) -> PathBuf {
    config.resolve(&relative_path(config))
}

/// True when the artifact exists with the shape its mode implies.
pub fn confirm(config: &BuildConfig, expected: &Path) -> bool {
    let confirmed = match config.mode() {
        BuildMode::SingleFile => expected.is_file(),
        BuildMode::Directory => expected.is_dir(),
    };
    if confirmed {
        log::debug!("Artifact confirmed at {}", expected.display());
    } else {
        log::warn!("Expected artifact missing at {}", expected.display());
    }
    confirmed
}

/// Confirms the artifact or fails with [`Error::ArtifactMissing`].
pub fn require(config: &BuildConfig) -> Result<PathBuf> {
    let expected = expected_path(config);
    if confirm(config, &expected) {
        Ok(expected)
    } else {
        Err(Error::ArtifactMissing {
            tool: config.tool().to_string(),
            path: expected,
        })
    }
}

/// Size and checksum of a confirmed artifact.
#[derive(Clone, Debug, Default)]
pub struct ArtifactSummary {
    /// Total size in bytes; summed over every file for directory artifacts.
    pub size: u64,
    /// SHA-256 of a single-file artifact.
    pub checksum: Option<String>,
}

/// Measures a confirmed artifact.
pub async fn summarize(config: &BuildConfig, path: &Path) -> Result<ArtifactSummary> {
    match config.mode() {
        BuildMode::SingleFile => {
            let size = tokio::fs::metadata(path)
                .await
                .fs_context("reading artifact metadata", path)?
                .len();
            let checksum = fs::sha256_file(path).await?;
            Ok(ArtifactSummary {
                size,
                checksum: Some(checksum),
            })
        }
        BuildMode::Directory => Ok(ArtifactSummary {
            size: fs::dir_size(path)?,
            checksum: None,
        }),
    }
}

/// Like [`summarize`], but a failure to measure only costs the checksum.
///
/// The artifact is already confirmed at this point, so the run still counts as
/// a success.
pub async fn summarize_or_partial(config: &BuildConfig, path: &Path) -> ArtifactSummary {
    match summarize(config, path).await {
        Ok(summary) => summary,
        Err(e) => {
            log::warn!("Could not summarize artifact {}: {}", path.display(), e);
            let size = tokio::fs::metadata(path).await.map(|m| m.len()).unwrap_or(0);
            ArtifactSummary {
                size,
                checksum: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{Platform, SettingsBuilder};
    use tempfile::TempDir;

    fn config(dir: &Path, mode: BuildMode, platform: Platform) -> BuildConfig {
        SettingsBuilder::new()
            .project_dir(dir)
            .script("server.py")
            .executable_name("file_server")
            .mode(mode)
            .platform(platform)
            .build()
            .unwrap()
    }

    #[test]
    fn test_relative_paths() {
        let dir = Path::new(".");
        assert_eq!(
            relative_path(&config(dir, BuildMode::SingleFile, Platform::Unix)),
            Path::new("dist/file_server")
        );
        assert_eq!(
            relative_path(&config(dir, BuildMode::SingleFile, Platform::Windows)),
            Path::new("dist/file_server.exe")
        );
        assert_eq!(
            relative_path(&config(dir, BuildMode::Directory, Platform::Windows)),
            Path::new("dist/file_server")
        );
    }

    #[test]
    fn test_missing_artifact_is_error() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path(), BuildMode::SingleFile, Platform::Unix);

        let err = require(&config).unwrap_err();
        assert!(matches!(err, Error::ArtifactMissing { .. }));
    }

    #[test]
    fn test_shape_must_match_mode() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("dist/file_server")).unwrap();

        let single = config(dir.path(), BuildMode::SingleFile, Platform::Unix);
        assert!(!confirm(&single, &expected_path(&single)));

        let directory = config(dir.path(), BuildMode::Directory, Platform::Unix);
        assert_eq!(require(&directory).unwrap(), dir.path().join("dist/file_server"));
    }

    #[tokio::test]
    async fn test_summarize_single_file() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("dist")).unwrap();
        std::fs::write(dir.path().join("dist/file_server"), b"abc").unwrap();

        let config = config(dir.path(), BuildMode::SingleFile, Platform::Unix);
        let path = require(&config).unwrap();
        let summary = summarize(&config, &path).await.unwrap();
        assert_eq!(summary.size, 3);
        assert_eq!(
            summary.checksum.as_deref(),
            Some("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_artifact_keeps_success() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dist/file_server");
        std::fs::create_dir_all(&path).unwrap();

        // Hashing a directory fails with EISDIR.
        let config = config(dir.path(), BuildMode::SingleFile, Platform::Unix);
        assert!(summarize(&config, &path).await.is_err());

        let summary = summarize_or_partial(&config, &path).await;
        assert!(summary.checksum.is_none());
    }
}
