//! Preflight verification of tools and inputs.
//!
//! Runs before anything touches the packaging tool:
//!
//! 1. Every required executable must resolve on PATH ([`Error::ToolMissing`]).
//! 2. The entry-point script must exist ([`Error::InputMissing`]).
//! 3. A missing icon is dropped with a warning.
//! 4. A missing data source is dropped with a warning, or fails the run when
//!    the policy is [`MissingDataPolicy::Fail`].
//!
//! The result is a [`VerifiedConfig`]: the original configuration minus the
//! dropped optional inputs.

use crate::bundler::{BuildConfig, DataMapping, Error, MissingDataPolicy, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// An optional input removed from the build because it does not exist.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DroppedInput {
    /// The icon resource.
    Icon(PathBuf),
    /// A data mapping whose source is absent.
    Data(DataMapping),
}

impl fmt::Display for DroppedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DroppedInput::Icon(path) => {
                write!(f, "icon {} not found, building without icon", path.display())
            }
            DroppedInput::Data(mapping) => write!(
                f,
                "data source {} not found, building without '{}'",
                mapping.source.display(),
                mapping.dest
            ),
        }
    }
}

/// A required executable resolved on PATH.
#[derive(Clone, Debug)]
pub struct ResolvedTool {
    /// Name as configured.
    pub name: String,
    /// Absolute location.
    pub path: PathBuf,
    /// First line of `--version` output, when the probe succeeded.
    pub version: Option<String>,
}

/// Configuration that passed preflight.
#[derive(Clone, Debug)]
pub struct VerifiedConfig {
    config: BuildConfig,
    dropped: Vec<DroppedInput>,
    tools: Vec<ResolvedTool>,
}

impl VerifiedConfig {
    /// The reduced configuration the assembler consumes.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Optional inputs dropped during verification, in discovery order.
    pub fn dropped(&self) -> &[DroppedInput] {
        &self.dropped
    }

    /// Resolved executables, packaging tool first. Empty when tools were not checked.
    pub fn tools(&self) -> &[ResolvedTool] {
        &self.tools
    }

    /// Location of the packaging tool, falling back to the configured name.
    pub fn tool_program(&self) -> PathBuf {
        self.tools
            .iter()
            .find(|t| t.name == self.config.tool())
            .map(|t| t.path.clone())
            .unwrap_or_else(|| PathBuf::from(self.config.tool()))
    }
}

/// Runs the full preflight: tools first, then inputs.
pub fn verify(config: &BuildConfig) -> Result<VerifiedConfig> {
    let tools = resolve_tools(config)?;
    let mut verified = verify_inputs(config)?;
    verified.tools = tools;
    Ok(verified)
}

/// Verifies input paths only, leaving tool resolution out.
///
/// Used for previews that never start the tool.
pub fn verify_inputs(config: &BuildConfig) -> Result<VerifiedConfig> {
    let script = config.resolve(config.script());
    if !script.exists() {
        return Err(Error::InputMissing {
            what: "entry-point script",
            path: script,
        });
    }

    let mut dropped = Vec::new();
    let mut reduced = config.clone();

    if let Some(icon) = config.icon()
        && !config.resolve(icon).exists()
    {
        log::warn!("Icon {} not found; dropping --icon", icon.display());
        dropped.push(DroppedInput::Icon(icon.to_path_buf()));
        reduced = reduced.without_icon();
    }

    let mut kept = Vec::with_capacity(config.data().len());
    for mapping in config.data() {
        let source = config.resolve(&mapping.source);
        if source.exists() {
            kept.push(mapping.clone());
            continue;
        }

        match config.missing_data() {
            MissingDataPolicy::Warn => {
                log::warn!(
                    "Data source {} not found; building without '{}'",
                    source.display(),
                    mapping.dest
                );
                dropped.push(DroppedInput::Data(mapping.clone()));
            }
            MissingDataPolicy::Fail => {
                return Err(Error::InputMissing {
                    what: "data source",
                    path: source,
                });
            }
        }
    }
    if kept.len() != config.data().len() {
        reduced = reduced.with_data(kept);
    }

    Ok(VerifiedConfig {
        config: reduced,
        dropped,
        tools: Vec::new(),
    })
}

/// Resolves every required executable, failing on the first one missing.
pub fn resolve_tools(config: &BuildConfig) -> Result<Vec<ResolvedTool>> {
    config
        .required_tools()
        .into_iter()
        .map(|name| resolve_tool(name, config.project_dir()))
        .collect()
}

fn resolve_tool(name: &str, project_dir: &Path) -> Result<ResolvedTool> {
    // Relative paths such as `./venv/bin/pyinstaller` are relative to the project.
    let candidate = Path::new(name);
    let lookup = if candidate.is_relative() && candidate.components().count() > 1 {
        project_dir.join(candidate)
    } else {
        candidate.to_path_buf()
    };

    let path = which::which(&lookup).map_err(|e| Error::ToolMissing {
        tool: name.to_string(),
        reason: e.to_string(),
    })?;
    log::debug!("Found {} at: {}", name, path.display());

    let version = probe_version(name, &path);
    Ok(ResolvedTool {
        name: name.to_string(),
        path,
        version,
    })
}

/// Best-effort `--version` probe. Presence on PATH is the only hard requirement.
fn probe_version(name: &str, path: &Path) -> Option<String> {
    match std::process::Command::new(path).arg("--version").output() {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            let version = stdout
                .lines()
                .chain(stderr.lines())
                .map(str::trim)
                .find(|l| !l.is_empty())
                .map(str::to_string);
            log::info!(
                "✓ {} available: {}",
                name,
                version.as_deref().unwrap_or("unknown version")
            );
            version
        }
        Ok(output) => {
            log::warn!(
                "{} found at {} but --version check failed (exit code: {:?}). Stderr: {}",
                name,
                path.display(),
                output.status.code(),
                String::from_utf8_lossy(&output.stderr)
            );
            None
        }
        Err(e) => {
            log::warn!(
                "{} found at {} but failed to execute: {}. Check file permissions.",
                name,
                path.display(),
                e
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::SettingsBuilder;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(dir.path().join("server.py"), "print('hi')\n").unwrap();
        dir
    }

    fn builder(dir: &TempDir) -> SettingsBuilder {
        SettingsBuilder::new()
            .project_dir(dir.path())
            .script("server.py")
            .executable_name("file_server")
    }

    #[test]
    fn test_missing_script_is_fatal() {
        let dir = TempDir::new().unwrap();
        let config = builder(&dir).build().unwrap();
        let err = verify_inputs(&config).unwrap_err();
        assert!(matches!(err, Error::InputMissing { what: "entry-point script", .. }));
    }

    #[test]
    fn test_missing_icon_is_dropped() {
        let dir = project();
        let config = builder(&dir).icon("icon.ico").build().unwrap();

        let verified = verify_inputs(&config).unwrap();
        assert_eq!(verified.config().icon(), None);
        assert_eq!(verified.dropped(), [DroppedInput::Icon(PathBuf::from("icon.ico"))]);
        // original untouched
        assert_eq!(config.icon(), Some(Path::new("icon.ico")));
    }

    #[test]
    fn test_present_inputs_kept() {
        let dir = project();
        fs::write(dir.path().join("icon.ico"), b"ico").unwrap();
        fs::create_dir(dir.path().join("static")).unwrap();
        let config = builder(&dir)
            .icon("icon.ico")
            .data(DataMapping::new("static", "static"))
            .build()
            .unwrap();

        let verified = verify_inputs(&config).unwrap();
        assert!(verified.dropped().is_empty());
        assert_eq!(verified.config(), &config);
    }

    #[test]
    fn test_missing_data_warn_policy_drops_only_missing() {
        let dir = project();
        fs::create_dir(dir.path().join("templates")).unwrap();
        let config = builder(&dir)
            .data(DataMapping::new("static", "static"))
            .data(DataMapping::new("templates", "templates"))
            .build()
            .unwrap();

        let verified = verify_inputs(&config).unwrap();
        assert_eq!(verified.config().data(), [DataMapping::new("templates", "templates")]);
        assert_eq!(
            verified.dropped(),
            [DroppedInput::Data(DataMapping::new("static", "static"))]
        );
    }

    #[test]
    fn test_missing_data_fail_policy() {
        let dir = project();
        let config = builder(&dir)
            .data(DataMapping::new("static", "static"))
            .missing_data(MissingDataPolicy::Fail)
            .build()
            .unwrap();

        let err = verify_inputs(&config).unwrap_err();
        assert!(matches!(err, Error::InputMissing { what: "data source", .. }));
    }

    #[test]
    fn test_missing_tool_names_the_tool() {
        let dir = project();
        let config = builder(&dir)
            .tool("definitely-not-a-real-packager-xyz")
            .build()
            .unwrap();

        match verify(&config).unwrap_err() {
            Error::ToolMissing { tool, .. } => {
                assert_eq!(tool, "definitely-not-a-real-packager-xyz")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_tool_resolved_relative_to_project() {
        use std::os::unix::fs::PermissionsExt;

        let dir = project();
        let bin = dir.path().join("bin");
        fs::create_dir(&bin).unwrap();
        let tool = bin.join("packager");
        fs::write(&tool, "#!/bin/sh\necho 'packager 6.1'\n").unwrap();
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

        let config = builder(&dir).tool("bin/packager").build().unwrap();
        let verified = verify(&config).unwrap();
        assert_eq!(verified.tools().len(), 1);
        assert_eq!(verified.tools()[0].version.as_deref(), Some("packager 6.1"));
        assert!(verified.tool_program().is_absolute());
    }
}
