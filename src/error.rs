//! Top-level error types for the packager CLI.
//!
//! This module wraps bundler failures and CLI problems with actionable
//! recovery suggestions and exit-code mapping.

use crate::bundler;
use thiserror::Error;

/// Result type alias for packager operations
pub type Result<T> = std::result::Result<T, PackagerError>;

/// Main error type for all packager operations
#[derive(Error, Debug)]
pub enum PackagerError {
    /// Bundler errors
    #[error("{0}")]
    Bundler(#[from] bundler::Error),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl PackagerError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            PackagerError::Bundler(e) => e.exit_code(),
            _ => 1,
        }
    }

    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            PackagerError::Bundler(e) => bundler_suggestions(e),
            PackagerError::Cli(CliError::InvalidArguments { .. }) => {
                vec!["Run with --help to see accepted arguments".to_string()]
            }
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}

fn bundler_suggestions(error: &bundler::Error) -> Vec<String> {
    match error {
        bundler::Error::Context(_, inner) => bundler_suggestions(inner),
        bundler::Error::Config { .. } => vec![
            "Provide --script and --name, or a config file with a [build] table".to_string(),
        ],
        bundler::Error::ToolMissing { tool, .. } => vec![
            format!("Install {tool} and make sure it is on PATH"),
            "Or point --tool at the executable, e.g. ./venv/bin/pyinstaller".to_string(),
        ],
        bundler::Error::InputMissing { what, path } => vec![format!(
            "Check that the {what} exists at {}",
            path.display()
        )],
        bundler::Error::BuildFailed { tool, .. } => vec![
            format!("Review the {tool} output above"),
            "Re-run with --keep-build to inspect the build directory".to_string(),
        ],
        bundler::Error::ArtifactMissing { .. } => vec![
            "The tool reported success without producing the artifact".to_string(),
            "Re-run with --keep-build and inspect the build directory".to_string(),
        ],
        bundler::Error::Interrupted { .. } => {
            vec!["Re-run the build; no partial state was kept".to_string()]
        }
        _ => vec!["Check the error message above for specific details".to_string()],
    }
}
