//! Command execution.
//!
//! Dispatches parsed arguments to the command implementations and turns their
//! errors into operator messages and exit codes.

mod build;
mod clean;
mod helpers;
mod preview;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;

use build::execute_build;
use clean::execute_clean;
use preview::execute_preview;

/// Execute the main command based on parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    // Validate arguments
    if let Err(validation_error) = args.validate() {
        // Create output for validation errors (never quiet)
        let output = super::OutputManager::new(false, false);
        output.error(&format!("Invalid arguments: {}", validation_error));
        return Ok(1);
    }

    let config = RuntimeConfig::from(&args);

    let result = match &args.command {
        Command::Build { build } => execute_build(build, &config).await,
        Command::Preview { build, json } => {
            execute_preview(build, *json, &config).await.map(|()| 0)
        }
        Command::Clean {
            name,
            config: config_file,
            project_dir,
        } => execute_clean(
            name.as_deref(),
            config_file.as_deref(),
            project_dir.as_deref(),
            &config,
        )
        .map(|()| 0),
    };

    match result {
        Ok(exit_code) => Ok(exit_code),
        Err(e) => {
            config.error_println(&format!("Command '{}' failed: {}", args.command.name(), e));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() && !config.is_quiet() {
                config.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    config.println(&format!("  • {}", suggestion));
                }
            }

            Ok(e.exit_code())
        }
    }
}
