//! PyInstaller build orchestration with guaranteed cleanup.
//!
//! Turns a declarative [`BuildConfig`] into one invocation of the packaging
//! tool, verifies the artifact it produces, and reclaims transient build state
//! on every exit path.
//!
//! # Pipeline
//!
//! | Stage | Module | Failure |
//! |-------|--------|---------|
//! | Configuration | [`settings`] | [`Error::Config`] |
//! | Preflight | [`preflight`] | [`Error::ToolMissing`], [`Error::InputMissing`] |
//! | Assembly | [`arguments`] | none |
//! | Execution | [`executor`] | [`Error::BuildFailed`], [`Error::Interrupted`] |
//! | Verification | [`artifact`] | [`Error::ArtifactMissing`] |
//! | Cleanup | [`cleanup`] | never fails the run |
//!
//! # Configuration
//!
//! ```toml
//! [build]
//! script = "server.py"
//! name = "file_server"
//! mode = "single-file"
//! hidden_imports = ["psutil", "markdown"]
//! missing_data = "warn"
//!
//! [[build.data]]
//! source = "static"
//! dest = "static"
//! ```

#![warn(missing_docs)]

pub mod arguments;
pub mod artifact;
mod builder;
pub mod cleanup;
mod error;
pub mod executor;
pub(crate) mod platform;
pub mod preflight;
pub mod settings;
pub(crate) mod utils;

// Public re-exports
pub use arguments::{ArgumentVector, assemble};
pub use artifact::ArtifactSummary;
pub use builder::{BuildOutcome, BuildResult, Bundler, PreparedBuild};
pub use cleanup::{CleanupGuard, CleanupReport};
pub use error::{Context, Error, ErrorExt, Result};
pub use platform::Platform;
pub use preflight::{DroppedInput, ResolvedTool, VerifiedConfig};
pub use settings::{
    BuildConfig, BuildMode, DataMapping, MissingDataPolicy, SettingsBuilder, SettingsFile,
};
