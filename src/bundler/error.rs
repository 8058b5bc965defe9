//! Error types for packaging operations.
//!
//! Provides the failure taxonomy of a packaging run together with contextual
//! error chaining and filesystem-specific errors.
//!
//! # Features
//!
//! - **Context trait**: Add context to errors similar to anyhow
//! - **ErrorExt trait**: Filesystem operations with automatic path context
//! - **bail! macro**: Early return with formatted error messages
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use kodegen_bundler_pyinstaller::bundler::{ErrorExt, Result};
//!
//! fn read_script(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path).fs_context("reading entry-point script", path)
//! }
//! ```

use std::{fmt::Display, io, path::PathBuf};
use thiserror::Error as DeriveError;

/// Errors returned by the bundler.
///
/// The first group of variants is the failure taxonomy of a packaging run.
/// Each of them is fatal; a dropped optional input is reported through
/// [`DroppedInput`](crate::bundler::DroppedInput) instead.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// Static configuration is incomplete or inconsistent.
    #[error("invalid build configuration: {reason}")]
    Config {
        /// What is wrong with the configuration
        reason: String,
    },

    /// A required executable could not be resolved on PATH.
    #[error("required tool '{tool}' not found on PATH: {reason}")]
    ToolMissing {
        /// Tool name as configured
        tool: String,
        /// Lookup failure reported by the resolver
        reason: String,
    },

    /// A required input path does not exist.
    #[error("required {what} not found at {}", path.display())]
    InputMissing {
        /// Kind of input ("entry-point script", "data source", ...)
        what: &'static str,
        /// Resolved path that was checked
        path: PathBuf,
    },

    /// The packaging tool exited with a non-zero status.
    #[error("{tool} failed with {}", describe_code(*code))]
    BuildFailed {
        /// Tool program that was run
        tool: String,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
    },

    /// The tool reported success but the expected artifact is absent.
    #[error("{tool} reported success but no artifact exists at {}", path.display())]
    ArtifactMissing {
        /// Tool program that was run
        tool: String,
        /// Expected artifact path
        path: PathBuf,
    },

    /// The build was interrupted by an external signal.
    #[error("build interrupted by {signal}")]
    Interrupted {
        /// Signal name (SIGINT, SIGTERM, ctrl-c)
        signal: &'static str,
    },

    /// Error with context. Created by the [`Context`] trait.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// File system error with path context.
    ///
    /// Created by the [`ErrorExt`] trait's `fs_context` method.
    #[error("{context} {path}: {error}")]
    Fs {
        /// Context describing the operation (e.g., "removing build directory")
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: io::Error,
    },

    /// Child process could not be spawned or awaited.
    #[error("failed to run command {command}: {error}")]
    CommandFailed {
        /// Command that failed to execute
        command: String,
        /// The underlying error
        error: io::Error,
    },

    /// Generic I/O error.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// Generic error with custom message.
    #[error("{0}")]
    GenericError(String),
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl Error {
    /// Shorthand for [`Error::Config`].
    pub fn config(reason: impl Into<String>) -> Self {
        Error::Config {
            reason: reason.into(),
        }
    }

    /// Process exit code this error maps to.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::BuildFailed {
                code: Some(code), ..
            } if *code != 0 => *code,
            Error::Interrupted { .. } => 130,
            Error::Context(_, inner) => inner.exit_code(),
            _ => 1,
        }
    }

    /// True if this error was raised before the packaging tool started.
    pub fn is_preflight(&self) -> bool {
        match self {
            Error::Config { .. } | Error::ToolMissing { .. } | Error::InputMissing { .. } => true,
            Error::Context(_, inner) => inner.is_preflight(),
            _ => false,
        }
    }
}

/// Convenient type alias for Result.
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for adding context to errors.
///
/// Similar to `anyhow::Context` but integrated with bundler's Error type.
/// Works with both `Result<T, E>` and `Option<T>`.
pub trait Context<T> {
    /// Add context to an error.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Add context to an error using a closure (lazy evaluation).
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Extension trait for filesystem operations with automatic path context.
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    ///
    /// The `context` should be a present-tense verb phrase describing the operation,
    /// e.g., "reading file", "removing directory".
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Macro for early return with error.
///
/// Converts the message into a [`Error::GenericError`] and returns immediately.
///
/// ```ignore
/// bail!("operation failed");
/// bail!("invalid value: {}", value);
/// ```
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::Error::GenericError($msg.into()))
    };
    ($err:expr $(,)?) => {
        return Err($crate::bundler::Error::GenericError($err.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($fmt, $($arg)*)))
    };
}
