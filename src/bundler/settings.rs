//! Configuration structures for packaging operations.
//!
//! This module provides the immutable [`BuildConfig`] consumed by every stage
//! of a packaging run, the [`SettingsBuilder`] that validates it, and the
//! [`SettingsFile`] TOML layer that feeds the builder.

use crate::bundler::{Error, ErrorExt, Platform, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Packaging tool invoked when none is configured.
pub const DEFAULT_TOOL: &str = "pyinstaller";

/// Packaging mode.
///
/// Each mode contributes exactly one flag to the argument vector.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BuildMode {
    /// One self-contained executable (`--onefile`).
    #[default]
    SingleFile,
    /// A directory holding the executable and its dependencies (`--onedir`).
    Directory,
}

impl BuildMode {
    /// Tool flag selecting this mode.
    pub fn flag(&self) -> &'static str {
        match self {
            BuildMode::SingleFile => "--onefile",
            BuildMode::Directory => "--onedir",
        }
    }
}

/// What to do when a data mapping's source does not exist.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MissingDataPolicy {
    /// Warn, drop the mapping and build without it.
    #[default]
    Warn,
    /// Abort preflight with an input-missing error.
    Fail,
}

/// A file or directory embedded into the artifact.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DataMapping {
    /// Path on disk, relative to the project directory unless absolute.
    pub source: PathBuf,
    /// Destination inside the bundle.
    pub dest: String,
}

impl DataMapping {
    /// Creates a mapping from `source` to `dest`.
    pub fn new(source: impl Into<PathBuf>, dest: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
        }
    }

    /// Parses the CLI form `SOURCE=DEST`, or `SOURCE` alone.
    ///
    /// Without an explicit destination the final component of the source is used,
    /// so `assets/static` lands at `static` inside the bundle.
    pub fn parse(value: &str) -> Result<Self> {
        let (source, dest) = match value.split_once('=') {
            Some((source, dest)) => (source.trim(), dest.trim().to_string()),
            None => {
                let source = value.trim();
                let dest = Path::new(source)
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                (source, dest)
            }
        };

        if source.is_empty() || dest.is_empty() {
            return Err(Error::config(format!(
                "data mapping '{value}' must have the form SOURCE=DEST or SOURCE"
            )));
        }

        Ok(Self::new(source, dest))
    }
}

/// Checks that an executable name is a plain file name.
///
/// Cleanup paths are derived from the name, so it must not escape the
/// project directory.
pub fn validate_executable_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(Error::config(format!(
            "executable name '{name}' must be a plain file name"
        )));
    }
    Ok(())
}

/// Immutable description of one packaging run.
///
/// Built once through [`SettingsBuilder`] and passed by reference to every
/// stage. Preflight may derive a reduced copy that omits dropped optional inputs,
/// the original is never mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildConfig {
    script: PathBuf,
    executable_name: String,
    mode: BuildMode,
    icon: Option<PathBuf>,
    hidden_imports: Vec<String>,
    data: Vec<DataMapping>,
    platform: Platform,
    project_dir: PathBuf,
    tool: String,
    required_tools: Vec<String>,
    missing_data: MissingDataPolicy,
    keep_build: bool,
}

impl BuildConfig {
    /// Entry-point script as configured.
    pub fn script(&self) -> &Path {
        &self.script
    }

    /// Base name of the output artifact.
    pub fn executable_name(&self) -> &str {
        &self.executable_name
    }

    /// Packaging mode.
    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    /// Optional icon resource.
    pub fn icon(&self) -> Option<&Path> {
        self.icon.as_deref()
    }

    /// Hidden imports in insertion order.
    pub fn hidden_imports(&self) -> &[String] {
        &self.hidden_imports
    }

    /// Data mappings in insertion order.
    pub fn data(&self) -> &[DataMapping] {
        &self.data
    }

    /// Target platform.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Directory the packaging tool runs in.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Packaging tool program.
    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Every executable that must be resolvable on PATH, packaging tool first.
    pub fn required_tools(&self) -> Vec<&str> {
        let mut tools = vec![self.tool.as_str()];
        for tool in &self.required_tools {
            if !tools.contains(&tool.as_str()) {
                tools.push(tool);
            }
        }
        tools
    }

    /// Policy for missing data sources.
    pub fn missing_data(&self) -> MissingDataPolicy {
        self.missing_data
    }

    /// True when transient build state must be retained.
    pub fn keep_build(&self) -> bool {
        self.keep_build
    }

    /// Resolves a configured path against the project directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.project_dir.join(path)
    }

    pub(crate) fn without_icon(&self) -> Self {
        Self {
            icon: None,
            ..self.clone()
        }
    }

    pub(crate) fn with_data(&self, data: Vec<DataMapping>) -> Self {
        Self {
            data,
            ..self.clone()
        }
    }
}

/// `[build]` table of a packaging config file.
///
/// ```toml
/// [build]
/// script = "server.py"
/// name = "file_server"
/// mode = "single-file"
/// hidden_imports = ["psutil"]
///
/// [[build.data]]
/// source = "static"
/// dest = "static"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSection {
    /// Entry-point script.
    pub script: Option<PathBuf>,
    /// Executable name.
    pub name: Option<String>,
    /// Packaging mode.
    pub mode: Option<BuildMode>,
    /// Icon resource.
    pub icon: Option<PathBuf>,
    /// Hidden imports.
    pub hidden_imports: Vec<String>,
    /// Data mappings.
    pub data: Vec<DataMapping>,
    /// Target platform override.
    pub platform: Option<Platform>,
    /// Project directory, relative to the config file.
    pub project_dir: Option<PathBuf>,
    /// Packaging tool program.
    pub tool: Option<String>,
    /// Additional required executables.
    pub required_tools: Vec<String>,
    /// Missing data policy.
    pub missing_data: Option<MissingDataPolicy>,
    /// Retain transient build state.
    pub keep_build: Option<bool>,
}

/// Parsed packaging config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsFile {
    /// The `[build]` table.
    pub build: BuildSection,
}

impl SettingsFile {
    /// Parses config file contents.
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::config(format!("malformed config file: {e}")))
    }

    /// Reads and parses a config file.
    ///
    /// A relative `project_dir` is resolved against the file's directory, and
    /// defaults to that directory when absent.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).fs_context("reading config file", path)?;
        let mut file = Self::parse(&contents).map_err(|e| match e {
            Error::Config { reason } => Error::config(format!("{}: {reason}", path.display())),
            other => other,
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        file.build.project_dir = Some(match file.build.project_dir.take() {
            Some(dir) => base.join(dir),
            None => base.to_path_buf(),
        });

        log::debug!("Loaded config file {}", path.display());
        Ok(file)
    }
}

/// Builder for constructing [`BuildConfig`].
///
/// Later calls override earlier ones, so layers are applied lowest precedence
/// first: [`apply_file`](Self::apply_file), then environment/CLI values.
///
/// # Examples
///
/// ```
/// use kodegen_bundler_pyinstaller::bundler::{BuildMode, DataMapping, SettingsBuilder};
///
/// # fn example() -> kodegen_bundler_pyinstaller::bundler::Result<()> {
/// let config = SettingsBuilder::new()
///     .script("server.py")
///     .executable_name("file_server")
///     .mode(BuildMode::SingleFile)
///     .hidden_import("psutil")
///     .data(DataMapping::new("static", "static"))
///     .build()?;
/// assert_eq!(config.executable_name(), "file_server");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    script: Option<PathBuf>,
    executable_name: Option<String>,
    mode: Option<BuildMode>,
    icon: Option<PathBuf>,
    hidden_imports: Vec<String>,
    data: Vec<DataMapping>,
    platform: Option<Platform>,
    project_dir: Option<PathBuf>,
    tool: Option<String>,
    required_tools: Vec<String>,
    missing_data: Option<MissingDataPolicy>,
    keep_build: Option<bool>,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Applies every value present in a config file.
    ///
    /// List values (hidden imports, data, required tools) are appended.
    pub fn apply_file(mut self, file: SettingsFile) -> Self {
        let build = file.build;
        if build.script.is_some() {
            self.script = build.script;
        }
        if build.name.is_some() {
            self.executable_name = build.name;
        }
        if build.mode.is_some() {
            self.mode = build.mode;
        }
        if build.icon.is_some() {
            self.icon = build.icon;
        }
        if build.platform.is_some() {
            self.platform = build.platform;
        }
        if build.project_dir.is_some() {
            self.project_dir = build.project_dir;
        }
        if build.tool.is_some() {
            self.tool = build.tool;
        }
        if build.missing_data.is_some() {
            self.missing_data = build.missing_data;
        }
        if build.keep_build.is_some() {
            self.keep_build = build.keep_build;
        }
        self.hidden_imports.extend(build.hidden_imports);
        self.data.extend(build.data);
        self.required_tools.extend(build.required_tools);
        self
    }

    /// Sets the entry-point script. Required.
    pub fn script<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.script = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the executable name. Required.
    pub fn executable_name(mut self, name: impl Into<String>) -> Self {
        self.executable_name = Some(name.into());
        self
    }

    /// Sets the packaging mode.
    ///
    /// Default: [`BuildMode::SingleFile`]
    pub fn mode(mut self, mode: BuildMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Sets the icon resource.
    pub fn icon<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.icon = Some(path.as_ref().to_path_buf());
        self
    }

    /// Appends one hidden import.
    pub fn hidden_import(mut self, module: impl Into<String>) -> Self {
        self.hidden_imports.push(module.into());
        self
    }

    /// Appends hidden imports, preserving order.
    pub fn hidden_imports<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden_imports.extend(modules.into_iter().map(Into::into));
        self
    }

    /// Appends one data mapping.
    pub fn data(mut self, mapping: DataMapping) -> Self {
        self.data.push(mapping);
        self
    }

    /// Appends data mappings, preserving order.
    pub fn data_mappings(mut self, mappings: impl IntoIterator<Item = DataMapping>) -> Self {
        self.data.extend(mappings);
        self
    }

    /// Sets the target platform.
    ///
    /// Default: [`Platform::current()`]
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Sets the project directory.
    ///
    /// Default: the current directory
    pub fn project_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.project_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the packaging tool program.
    ///
    /// Default: [`DEFAULT_TOOL`]
    pub fn tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }

    /// Appends an executable that must be present on PATH.
    pub fn required_tool(mut self, tool: impl Into<String>) -> Self {
        self.required_tools.push(tool.into());
        self
    }

    /// Sets the missing data policy.
    ///
    /// Default: [`MissingDataPolicy::Warn`]
    pub fn missing_data(mut self, policy: MissingDataPolicy) -> Self {
        self.missing_data = Some(policy);
        self
    }

    /// Retains transient build state instead of removing it.
    pub fn keep_build(mut self, keep: bool) -> Self {
        self.keep_build = Some(keep);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if:
    /// - `script` or `executable_name` is missing or empty
    /// - `executable_name` is not a plain file name
    /// - a data mapping is empty or contains the platform separator
    /// - `tool` is empty
    pub fn build(self) -> Result<BuildConfig> {
        let script = self
            .script
            .filter(|s| !s.as_os_str().is_empty())
            .ok_or_else(|| Error::config("entry-point script is required"))?;

        let executable_name = self
            .executable_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::config("executable name is required"))?;

        validate_executable_name(&executable_name)?;

        let platform = self.platform.unwrap_or_else(Platform::current);
        let separator = platform.data_separator();
        for mapping in &self.data {
            let source = mapping.source.to_string_lossy();
            if source.is_empty() || mapping.dest.is_empty() {
                return Err(Error::config(format!(
                    "data mapping '{}' -> '{}' has an empty side",
                    source, mapping.dest
                )));
            }
            if source.contains(separator) || mapping.dest.contains(separator) {
                return Err(Error::config(format!(
                    "data mapping '{}' -> '{}' contains the {} separator '{}'",
                    source, mapping.dest, platform, separator
                )));
            }
        }

        let tool = self.tool.unwrap_or_else(|| DEFAULT_TOOL.to_string());
        if tool.trim().is_empty() {
            return Err(Error::config("packaging tool must not be empty"));
        }

        let icon = self.icon.filter(|i| !i.as_os_str().is_empty());
        let project_dir = self
            .project_dir
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(BuildConfig {
            script,
            executable_name,
            mode: self.mode.unwrap_or_default(),
            icon,
            hidden_imports: self.hidden_imports,
            data: self.data,
            platform,
            project_dir,
            tool,
            required_tools: self.required_tools,
            missing_data: self.missing_data.unwrap_or_default(),
            keep_build: self.keep_build.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> SettingsBuilder {
        SettingsBuilder::new()
            .script("server.py")
            .executable_name("file_server")
    }

    #[test]
    fn test_defaults() {
        let config = base().build().unwrap();
        assert_eq!(config.mode(), BuildMode::SingleFile);
        assert_eq!(config.platform(), Platform::current());
        assert_eq!(config.tool(), DEFAULT_TOOL);
        assert_eq!(config.missing_data(), MissingDataPolicy::Warn);
        assert!(!config.keep_build());
        assert_eq!(config.project_dir(), Path::new("."));
    }

    #[test]
    fn test_missing_required_fields() {
        let err = SettingsBuilder::new().executable_name("x").build().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));

        let err = SettingsBuilder::new().script("server.py").build().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));

        let err = base().executable_name("   ").build().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_executable_name_must_be_plain() {
        for name in ["../evil", "dist/app", "..", "a\\b"] {
            let err = base().executable_name(name).build().unwrap_err();
            assert!(matches!(err, Error::Config { .. }), "{name} accepted");
        }
    }

    #[test]
    fn test_separator_in_mapping_rejected_per_platform() {
        let err = base()
            .platform(Platform::Unix)
            .data(DataMapping::new("a:b", "static"))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));

        // ':' is harmless when the separator is ';'
        let config = base()
            .platform(Platform::Windows)
            .data(DataMapping::new("C:\\assets", "static"))
            .build()
            .unwrap();
        assert_eq!(config.data().len(), 1);
    }

    #[test]
    fn test_required_tools_deduplicated() {
        let config = base()
            .required_tool("python3")
            .required_tool("pyinstaller")
            .build()
            .unwrap();
        assert_eq!(config.required_tools(), vec!["pyinstaller", "python3"]);
    }

    #[test]
    fn test_data_mapping_parse() {
        assert_eq!(
            DataMapping::parse("static=static").unwrap(),
            DataMapping::new("static", "static")
        );
        assert_eq!(
            DataMapping::parse("assets/static").unwrap(),
            DataMapping::new("assets/static", "static")
        );
        assert!(DataMapping::parse("=dest").is_err());
        assert!(DataMapping::parse("").is_err());
    }

    #[test]
    fn test_file_layer_then_overrides() {
        let file = SettingsFile::parse(
            r#"
            [build]
            script = "server.py"
            name = "file_server"
            mode = "directory"
            hidden_imports = ["psutil", "markdown"]
            missing_data = "fail"

            [[build.data]]
            source = "static"
            dest = "static"
            "#,
        )
        .unwrap();

        let config = SettingsBuilder::new()
            .apply_file(file)
            .hidden_import("socketserver")
            .executable_name("renamed")
            .build()
            .unwrap();

        assert_eq!(config.executable_name(), "renamed");
        assert_eq!(config.mode(), BuildMode::Directory);
        assert_eq!(config.hidden_imports(), ["psutil", "markdown", "socketserver"]);
        assert_eq!(config.data(), [DataMapping::new("static", "static")]);
        assert_eq!(config.missing_data(), MissingDataPolicy::Fail);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = SettingsFile::parse("[build]\nonefile = true\n").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
