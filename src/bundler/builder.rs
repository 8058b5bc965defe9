//! Packaging orchestration.
//!
//! This module provides the [`Bundler`] orchestrator that drives one packaging
//! run end to end.
//!
//! # Overview
//!
//! 1. Preflight verifies tools and inputs ([`preflight::verify`])
//! 2. The argument vector is assembled ([`assemble`])
//! 3. A [`CleanupGuard`] is registered over the transient build state
//! 4. The packaging tool runs ([`executor::run`])
//! 5. On reported success the artifact is confirmed ([`artifact::require`])
//! 6. The guard is released, whatever happened in 4 and 5
//!
//! Preflight failures happen before anything is registered or spawned.
//!
//! # Example
//!
//! ```no_run
//! use kodegen_bundler_pyinstaller::bundler::{Bundler, DataMapping, SettingsBuilder};
//!
//! # async fn example() -> kodegen_bundler_pyinstaller::bundler::Result<()> {
//! let config = SettingsBuilder::new()
//!     .script("server.py")
//!     .executable_name("file_server")
//!     .hidden_import("psutil")
//!     .data(DataMapping::new("static", "static"))
//!     .build()?;
//!
//! let result = Bundler::new(config).package().await?;
//! println!("Created: {} ({} bytes)", result.output_path.display(), result.summary.size);
//! # Ok(())
//! # }
//! ```

use crate::bundler::{
    ArgumentVector, ArtifactSummary, BuildConfig, CleanupGuard, CleanupReport, DroppedInput,
    Error, Result, VerifiedConfig, artifact, assemble, executor, preflight,
};
use crate::bundler::executor::InterruptListener;
use std::path::PathBuf;

/// Main packaging orchestrator.
#[derive(Debug, Clone)]
pub struct Bundler {
    config: BuildConfig,
}

impl Bundler {
    /// Creates a bundler for a validated configuration.
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration as given.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Runs preflight and assembles the command without executing anything.
    ///
    /// # Errors
    ///
    /// [`Error::ToolMissing`] or [`Error::InputMissing`]; nothing has been
    /// spawned or registered when these are returned.
    pub fn prepare(&self) -> Result<PreparedBuild> {
        let verified = preflight::verify(&self.config)?;
        Ok(PreparedBuild::new(verified))
    }

    /// Like [`prepare`](Self::prepare) but skips tool resolution.
    ///
    /// For previews on machines without the packaging tool installed.
    pub fn prepare_inputs(&self) -> Result<PreparedBuild> {
        let verified = preflight::verify_inputs(&self.config)?;
        Ok(PreparedBuild::new(verified))
    }

    /// Prepares and executes a full packaging run.
    pub async fn package(&self) -> Result<BuildResult> {
        self.prepare()?.execute().await.into_result()
    }
}

/// A verified configuration with its assembled command, ready to run.
#[derive(Debug, Clone)]
pub struct PreparedBuild {
    verified: VerifiedConfig,
    args: ArgumentVector,
}

impl PreparedBuild {
    fn new(verified: VerifiedConfig) -> Self {
        let args = assemble(verified.config());
        Self { verified, args }
    }

    /// The configuration minus dropped inputs.
    pub fn config(&self) -> &BuildConfig {
        self.verified.config()
    }

    /// Preflight details.
    pub fn verified(&self) -> &VerifiedConfig {
        &self.verified
    }

    /// Optional inputs that were dropped.
    pub fn dropped(&self) -> &[DroppedInput] {
        self.verified.dropped()
    }

    /// Tokens passed to the tool.
    pub fn args(&self) -> &ArgumentVector {
        &self.args
    }

    /// Program that will be spawned.
    pub fn program(&self) -> PathBuf {
        self.verified.tool_program()
    }

    /// Where the artifact is expected.
    pub fn expected_artifact(&self) -> PathBuf {
        artifact::expected_path(self.config())
    }

    /// Transient paths the cleanup guard will own.
    pub fn transient_paths(&self) -> Vec<PathBuf> {
        crate::bundler::cleanup::transient_paths(self.config())
    }

    /// Runs the tool inside the cleanup region.
    ///
    /// The guard is registered before the child is spawned and released after
    /// the run settles, so cleanup happens exactly once on success, tool
    /// failure, missing artifact or interrupt. If this future is dropped
    /// mid-run the guard's drop handler still cleans up.
    pub async fn execute(self) -> BuildOutcome {
        let guard = CleanupGuard::register(self.config());
        let result = self.run_protected().await;
        let cleanup = guard.release();

        if cleanup.retained {
            log::info!("Cleanup disabled; transient build state retained");
        }

        BuildOutcome { result, cleanup }
    }

    async fn run_protected(&self) -> Result<BuildResult> {
        let config = self.config();
        let program = self.program();

        // Stays installed until the artifact is measured.
        let mut interrupt = InterruptListener::install()?;

        log::info!("Running {} {}", program.display(), self.args);
        let status =
            executor::run_with(&program, &self.args, config.project_dir(), &mut interrupt).await?;

        if !status.success() {
            return Err(Error::BuildFailed {
                tool: config.tool().to_string(),
                code: status.code(),
            });
        }

        let output_path = artifact::require(config)?;
        let summary = tokio::select! {
            biased;
            signal = interrupt.recv() => {
                log::warn!("Received {} while measuring the artifact", signal);
                return Err(Error::Interrupted { signal });
            }
            summary = artifact::summarize_or_partial(config, &output_path) => summary,
        };

        Ok(BuildResult {
            exit_code: status.code().unwrap_or(0),
            output_path,
            artifact_confirmed: true,
            summary,
            dropped: self.dropped().to_vec(),
        })
    }
}

/// A verified, successful packaging run.
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// Exit code reported by the tool.
    pub exit_code: i32,
    /// Location of the artifact.
    pub output_path: PathBuf,
    /// True once the artifact was found on disk.
    pub artifact_confirmed: bool,
    /// Size and checksum of the artifact.
    pub summary: ArtifactSummary,
    /// Optional inputs that were left out of the build.
    pub dropped: Vec<DroppedInput>,
}

/// Result of [`PreparedBuild::execute`] together with the cleanup report.
#[derive(Debug)]
pub struct BuildOutcome {
    /// Run result.
    pub result: Result<BuildResult>,
    /// What the cleanup guard did.
    pub cleanup: CleanupReport,
}

impl BuildOutcome {
    /// Drops the cleanup report.
    pub fn into_result(self) -> Result<BuildResult> {
        self.result
    }
}
