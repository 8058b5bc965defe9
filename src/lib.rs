//! # Kodegen PyInstaller Bundler
//!
//! Build orchestration for packaging a Python entry point into a standalone
//! executable with PyInstaller.
//!
//! A run is a linear pipeline: a declarative configuration is verified, turned
//! into one deterministic tool invocation, executed, and its artifact
//! confirmed. Transient build state is reclaimed on every exit path, including
//! tool failure, interrupts and panics.
//!
//! ## Features
//!
//! - **Preflight**: Missing tools and entry points fail before anything runs
//! - **Deterministic Commands**: Same configuration, same argument vector
//! - **Artifact Verification**: A zero exit status alone is not success
//! - **Guaranteed Cleanup**: `build/` and `<name>.spec` never outlive the run
//!
//! ## Usage
//!
//! ```bash
//! kodegen_bundler_pyinstaller build --script server.py --name file_server
//! kodegen_bundler_pyinstaller build --config packager.toml --onedir
//! kodegen_bundler_pyinstaller preview --config packager.toml --json
//! kodegen_bundler_pyinstaller clean --name file_server
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod bundler;
pub mod cli;
pub mod error;

// Re-export main types for public API
pub use bundler::{BuildConfig, BuildResult, Bundler, SettingsBuilder};
pub use cli::Args;
pub use error::{CliError, PackagerError, Result};
