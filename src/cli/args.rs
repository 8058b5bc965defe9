//! Command line argument parsing and validation.
//!
//! Every build option can come from a config file, an environment variable
//! or a flag; flags win over environment, environment wins over the file.

use crate::bundler::{BuildMode, DataMapping, MissingDataPolicy, Platform};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Package a Python entry point into a platform-native executable
#[derive(Parser, Debug)]
#[command(
    name = "kodegen_bundler_pyinstaller",
    version,
    about = "Package a Python entry point into a platform-native executable",
    long_about = "Runs PyInstaller once with arguments derived from a declarative build
configuration, verifies the artifact it produced, and always removes the
transient build/ directory and .spec descriptor afterwards.

Usage:
  kodegen_bundler_pyinstaller build --script server.py --name file_server --add-data static=static
  kodegen_bundler_pyinstaller build --config packager.toml --onedir
  kodegen_bundler_pyinstaller preview --config packager.toml --platform windows --json
  kodegen_bundler_pyinstaller clean --name file_server

Exit code 0 = artifact guaranteed to exist at dist/<name>[.exe] or dist/<name>/."
)]
pub struct Args {
    /// Command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Show detailed progress
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Package the entry point and verify the artifact
    Build {
        /// Build options
        #[command(flatten)]
        build: BuildArgs,
    },

    /// Show the command `build` would run, without running it
    Preview {
        /// Build options
        #[command(flatten)]
        build: BuildArgs,

        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove transient build state left by an earlier run
    Clean {
        /// Executable name whose descriptor should be removed
        #[arg(short, long, env = "KODEGEN_PYINSTALLER_NAME")]
        name: Option<String>,

        /// Config file providing the name and project directory
        #[arg(short, long, env = "KODEGEN_PYINSTALLER_CONFIG")]
        config: Option<PathBuf>,

        /// Project directory
        #[arg(long, env = "KODEGEN_PYINSTALLER_PROJECT_DIR")]
        project_dir: Option<PathBuf>,
    },
}

impl Command {
    /// Command name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Build { .. } => "build",
            Command::Preview { .. } => "preview",
            Command::Clean { .. } => "clean",
        }
    }
}

/// Options shared by `build` and `preview`
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Config file with a [build] table
    #[arg(short, long, value_name = "PATH", env = "KODEGEN_PYINSTALLER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Entry-point script to package
    #[arg(short, long, value_name = "PATH", env = "KODEGEN_PYINSTALLER_SCRIPT")]
    pub script: Option<PathBuf>,

    /// Base name of the produced executable
    #[arg(short, long, env = "KODEGEN_PYINSTALLER_NAME")]
    pub name: Option<String>,

    /// Packaging mode
    #[arg(short, long, value_enum, env = "KODEGEN_PYINSTALLER_MODE")]
    pub mode: Option<BuildMode>,

    /// Shorthand for --mode single-file
    #[arg(long, conflicts_with_all = ["mode", "onedir"])]
    pub onefile: bool,

    /// Shorthand for --mode directory
    #[arg(long, conflicts_with = "mode")]
    pub onedir: bool,

    /// Icon resource; dropped with a warning if missing
    #[arg(short, long, value_name = "PATH", env = "KODEGEN_PYINSTALLER_ICON")]
    pub icon: Option<PathBuf>,

    /// Module the tool cannot detect on its own (repeatable)
    #[arg(long = "hidden-import", value_name = "MODULE")]
    pub hidden_imports: Vec<String>,

    /// Data to embed, as SOURCE=DEST or SOURCE (repeatable)
    #[arg(long = "add-data", value_name = "SOURCE=DEST")]
    pub data: Vec<String>,

    /// Target platform (defaults to the host)
    #[arg(short, long, value_enum, env = "KODEGEN_PYINSTALLER_PLATFORM")]
    pub platform: Option<Platform>,

    /// Directory the tool runs in
    #[arg(long, value_name = "PATH", env = "KODEGEN_PYINSTALLER_PROJECT_DIR")]
    pub project_dir: Option<PathBuf>,

    /// Packaging tool program
    #[arg(long, env = "KODEGEN_PYINSTALLER_TOOL")]
    pub tool: Option<String>,

    /// Additional executable that must be on PATH (repeatable)
    #[arg(long = "require-tool", value_name = "TOOL")]
    pub required_tools: Vec<String>,

    /// What to do when a data source is missing
    #[arg(long, value_enum, env = "KODEGEN_PYINSTALLER_MISSING_DATA")]
    pub missing_data: Option<MissingDataPolicy>,

    /// Keep build/ and the .spec descriptor
    #[arg(long, env = "KODEGEN_PYINSTALLER_KEEP_BUILD")]
    pub keep_build: bool,
}

impl BuildArgs {
    /// Mode selected by --mode, --onefile or --onedir
    pub fn selected_mode(&self) -> Option<BuildMode> {
        if self.onefile {
            Some(BuildMode::SingleFile)
        } else if self.onedir {
            Some(BuildMode::Directory)
        } else {
            self.mode
        }
    }

    /// Parsed --add-data values
    pub fn data_mappings(&self) -> crate::bundler::Result<Vec<DataMapping>> {
        self.data.iter().map(|d| DataMapping::parse(d)).collect()
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Command::Build { build } | Command::Preview { build, .. } => {
                if build.config.is_none() && build.script.is_none() {
                    return Err("Either --config or --script is required".to_string());
                }
                build.data_mappings().map_err(|e| e.to_string())?;
            }
            Command::Clean { name, config, .. } => {
                if name.is_none() && config.is_none() {
                    return Err("Either --name or --config is required".to_string());
                }
            }
        }

        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self {
            output: super::OutputManager::new(args.verbose, args.quiet),
        }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print verbose message if in verbose mode
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print progress message
    pub fn progress(&self, message: &str) {
        let _ = self.output.progress(message);
    }

    /// Print section header
    pub fn section(&self, title: &str) {
        let _ = self.output.section(title);
    }

    /// Print a summary row
    pub fn field(&self, label: &str, value: &str) {
        let _ = self.output.field(label, value);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }

    /// Check if verbose output is enabled
    pub fn is_verbose(&self) -> bool {
        self.output.is_verbose()
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.output.is_quiet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(
            std::iter::once("kodegen_bundler_pyinstaller").chain(argv.iter().copied()),
        )
    }

    #[test]
    fn test_build_flags() {
        let args = parse(&[
            "build",
            "--script",
            "server.py",
            "--name",
            "file_server",
            "--onedir",
            "--hidden-import",
            "psutil",
            "--hidden-import",
            "markdown",
            "--add-data",
            "static=static",
            "--platform",
            "windows",
        ])
        .unwrap();
        assert!(args.validate().is_ok());

        let Command::Build { build } = args.command else {
            panic!("expected build command");
        };
        assert_eq!(build.selected_mode(), Some(BuildMode::Directory));
        assert_eq!(build.hidden_imports, ["psutil", "markdown"]);
        assert_eq!(build.platform, Some(Platform::Windows));
        assert_eq!(
            build.data_mappings().unwrap(),
            [DataMapping::new("static", "static")]
        );
    }

    #[test]
    fn test_mode_flags_are_exclusive() {
        assert!(parse(&["build", "-s", "a.py", "--onefile", "--onedir"]).is_err());
        assert!(parse(&["build", "-s", "a.py", "--onedir", "--mode", "single-file"]).is_err());
    }

    #[test]
    fn test_validate_requires_input() {
        let args = parse(&["build", "--name", "x"]).unwrap();
        assert!(args.validate().is_err());

        let args = parse(&["clean"]).unwrap();
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_data_mapping() {
        let args = parse(&["preview", "-s", "a.py", "--add-data", "=x"]).unwrap();
        assert!(args.validate().is_err());
    }
}
