//! Packaging tool execution.
//!
//! Spawns the tool as a child process with inherited stdout/stderr so its
//! output reaches the operator verbatim, then blocks on termination. An
//! interrupt received while waiting kills and reaps the child and surfaces as
//! [`Error::Interrupted`], letting the caller's cleanup guard fire on the way
//! out. There is no timeout and no retry.
//!
//! Installing an [`InterruptListener`] replaces the default SIGINT/SIGTERM
//! disposition for the rest of the process. Signals are only acted on while
//! some listener is awaited, so callers with work after the tool exits keep
//! listening through it (see [`run_with`]).

use crate::bail;
use crate::bundler::{ArgumentVector, Error, Result};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// How long a failed exit waits for an interrupt that raced it.
///
/// A terminal interrupt reaches the whole process group, so the tool can die of
/// the same signal before ours is delivered.
const INTERRUPT_GRACE: Duration = Duration::from_millis(200);

/// Runs `program` with `args` inside `working_dir` and returns its exit status.
///
/// A non-zero status is returned as-is; mapping it to a failure is the
/// caller's decision.
pub async fn run(program: &Path, args: &ArgumentVector, working_dir: &Path) -> Result<ExitStatus> {
    let mut interrupt = InterruptListener::install()?;
    run_with(program, args, working_dir, &mut interrupt).await
}

/// Like [`run`], observing interrupts through a caller-owned listener.
///
/// The listener must be installed before this is called so no interrupt
/// between spawn and wait is missed.
pub async fn run_with(
    program: &Path,
    args: &ArgumentVector,
    working_dir: &Path,
    interrupt: &mut InterruptListener,
) -> Result<ExitStatus> {
    if !working_dir.is_dir() {
        bail!("working directory {} does not exist", working_dir.display());
    }

    log::debug!(
        "Spawning {} {} (cwd: {})",
        program.display(),
        args,
        working_dir.display()
    );

    let mut child = Command::new(program)
        .args(args.as_slice())
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .map_err(|error| Error::CommandFailed {
            command: program.display().to_string(),
            error,
        })?;

    let status = tokio::select! {
        biased;
        signal = interrupt.recv() => {
            log::warn!("Received {}; terminating {}", signal, program.display());
            if let Err(e) = child.kill().await {
                log::warn!("Failed to kill {}: {}", program.display(), e);
            }
            return Err(Error::Interrupted { signal });
        }
        status = child.wait() => status.map_err(|error| Error::CommandFailed {
            command: program.display().to_string(),
            error,
        })?,
    };
    log::debug!("{} exited with {:?}", program.display(), status.code());

    if !status.success()
        && let Ok(signal) = tokio::time::timeout(INTERRUPT_GRACE, interrupt.recv()).await
    {
        log::warn!("Received {} while {} was exiting", signal, program.display());
        return Err(Error::Interrupted { signal });
    }

    Ok(status)
}

/// Termination signals observed while the tool runs.
///
/// Unix listens for SIGINT and SIGTERM; other platforms for ctrl-c.
#[derive(Debug)]
pub struct InterruptListener {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl InterruptListener {
    /// Starts listening. Signals delivered from here on are queued.
    #[cfg(unix)]
    pub fn install() -> Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// Starts listening.
    #[cfg(not(unix))]
    pub fn install() -> Result<Self> {
        Ok(Self {})
    }

    /// Waits for the next interrupt and returns the signal name.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
        }
    }

    /// Waits for the next interrupt and returns the signal name.
    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> &'static str {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "ctrl-c",
            Err(e) => {
                log::warn!("Unable to listen for ctrl-c: {}", e);
                std::future::pending().await
            }
        }
    }
}
