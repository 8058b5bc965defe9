//! Kodegen PyInstaller Bundler - PyInstaller builds with guaranteed cleanup.
//!
//! This binary verifies a packaging configuration, runs the packaging tool and
//! reports the artifact it produced.

use kodegen_bundler_pyinstaller::cli;
use kodegen_bundler_pyinstaller::cli::OutputManager;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            // Create output manager for error display (never quiet for fatal errors)
            let output = OutputManager::new(false, false);
            output.error(&format!("Fatal error: {e}"));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                let _ = output.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    let _ = output.indent(&suggestion);
                }
            }

            process::exit(e.exit_code());
        }
    }
}
