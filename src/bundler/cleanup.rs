//! RAII guard for transient build state.
//!
//! The packaging tool leaves a `build/` work directory and a `<name>.spec`
//! descriptor next to the entry point. [`CleanupGuard`] is registered before the
//! tool starts and removes both exactly once: on explicit
//! [`release`](CleanupGuard::release), or on drop when the protected region is
//! left early through an error, an interrupt, or a panic.
//!
//! Only paths derived from the fixed build directory name and the executable
//! name are ever touched; the script, data sources and `dist/` are not.

use crate::bundler::{
    BuildConfig,
    utils::fs::{Removal, remove_path},
};
use std::path::{Path, PathBuf};

/// Work directory the packaging tool creates inside the project.
pub const BUILD_DIR: &str = "build";

/// File name of the generated build descriptor.
pub fn descriptor_name(executable_name: &str) -> String {
    format!("{executable_name}.spec")
}

/// Transient paths of a build, resolved against the project directory.
pub fn transient_paths(config: &BuildConfig) -> Vec<PathBuf> {
    transient_paths_in(config.project_dir(), config.executable_name())
}

/// Transient paths for `executable_name` inside `project_dir`.
pub fn transient_paths_in(project_dir: &Path, executable_name: &str) -> Vec<PathBuf> {
    vec![
        project_dir.join(BUILD_DIR),
        project_dir.join(descriptor_name(executable_name)),
    ]
}

/// What a cleanup pass did.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CleanupReport {
    /// Paths that existed and were removed.
    pub removed: Vec<PathBuf>,
    /// Paths that were already absent.
    pub absent: Vec<PathBuf>,
    /// Paths that could not be removed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
    /// True when cleanup was disabled and everything was kept.
    pub retained: bool,
}

impl CleanupReport {
    /// True if every path is gone (or cleanup was disabled).
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Guaranteed removal of transient build state.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_pyinstaller::bundler::{CleanupGuard, SettingsBuilder};
///
/// # fn example() -> kodegen_bundler_pyinstaller::bundler::Result<()> {
/// let config = SettingsBuilder::new()
///     .script("server.py")
///     .executable_name("file_server")
///     .build()?;
///
/// let guard = CleanupGuard::register(&config);
/// // ... run the packaging tool; an early return still cleans up ...
/// let report = guard.release();
/// println!("removed {} path(s)", report.removed.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CleanupGuard {
    paths: Vec<PathBuf>,
    enabled: bool,
    released: bool,
}

impl CleanupGuard {
    /// Registers cleanup for the transient paths of `config`.
    ///
    /// Honors [`BuildConfig::keep_build`].
    pub fn register(config: &BuildConfig) -> Self {
        Self::with_paths(transient_paths(config), !config.keep_build())
    }

    /// Registers cleanup over an explicit path set.
    pub fn with_paths(paths: Vec<PathBuf>, enabled: bool) -> Self {
        log::debug!(
            "Registered cleanup for {:?} ({})",
            paths,
            if enabled { "enabled" } else { "disabled" }
        );
        Self {
            paths,
            enabled,
            released: false,
        }
    }

    /// Paths this guard is responsible for.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Runs cleanup now and disarms the drop handler.
    pub fn release(mut self) -> CleanupReport {
        self.run()
    }

    fn run(&mut self) -> CleanupReport {
        self.released = true;

        if !self.enabled {
            for path in &self.paths {
                log::info!("Retaining build artifact {}", path.display());
            }
            return CleanupReport {
                retained: true,
                ..Default::default()
            };
        }

        let mut report = CleanupReport::default();
        for path in &self.paths {
            match remove_path(path) {
                Ok(Removal::Removed) => {
                    log::info!("Removed {}", path.display());
                    report.removed.push(path.clone());
                }
                Ok(Removal::Absent) => report.absent.push(path.clone()),
                Err(e) => {
                    // Keep going: one stuck path must not shield the others.
                    log::warn!("Failed to remove {}: {}", path.display(), e);
                    report.failed.push((path.clone(), e.to_string()));
                }
            }
        }
        report
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if !self.released {
            log::debug!("Cleanup guard dropped before release; cleaning up");
            // Drop must never panic; failures are already logged by run().
            let _ = self.run();
        }
    }
}
