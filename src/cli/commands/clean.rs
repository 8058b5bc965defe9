//! Clean command implementation.
//!
//! Removes transient state left behind by a build that was killed too hard for
//! its cleanup guard to run (SIGKILL, power loss). `dist/` is never touched.

use super::helpers::print_cleanup;
use crate::bundler::{CleanupGuard, SettingsFile, cleanup, settings};
use crate::cli::RuntimeConfig;
use crate::error::{CliError, Result};
use anyhow::Context as _;
use std::path::{Path, PathBuf};

/// Execute clean command
pub(super) fn execute_clean(
    name: Option<&str>,
    config_file: Option<&Path>,
    project_dir: Option<&Path>,
    config: &RuntimeConfig,
) -> Result<()> {
    let file = config_file.map(SettingsFile::load).transpose()?;
    let (file_name, file_dir) = match file {
        Some(file) => (file.build.name, file.build.project_dir),
        None => (None, None),
    };

    let name = name
        .map(str::to_string)
        .or(file_name)
        .ok_or_else(|| CliError::InvalidArguments {
            reason: "clean needs --name or a config file that sets it".to_string(),
        })?;
    settings::validate_executable_name(&name)?;

    let project_dir = match project_dir.map(Path::to_path_buf).or(file_dir) {
        Some(dir) => dir,
        None => current_dir()?,
    };

    config.section("Clean");
    config.verbose_println(&format!(
        "Removing transient state for '{}' in {}",
        name,
        project_dir.display()
    ));

    let guard = CleanupGuard::with_paths(cleanup::transient_paths_in(&project_dir, &name), true);
    for path in guard.paths() {
        config.verbose_println(&format!("Checking {}", path.display()));
    }
    let report = guard.release();
    print_cleanup(&report, config);

    if !report.is_clean() {
        return Err(CliError::ExecutionFailed {
            command: "clean".to_string(),
            reason: format!("{} path(s) could not be removed", report.failed.len()),
        }
        .into());
    }

    if report.removed.is_empty() {
        config.success_println("Nothing to clean");
    } else {
        config.success_println(&format!("Removed {} path(s)", report.removed.len()));
    }
    Ok(())
}

fn current_dir() -> Result<PathBuf> {
    Ok(std::env::current_dir().context("resolving the current directory")?)
}
