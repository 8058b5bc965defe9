//! Build command implementation.
//!
//! Runs preflight, then the packaging tool inside the cleanup region, then
//! prints the artifact summary.

use super::helpers::{
    load_build_config, print_build_summary, print_cleanup, print_dropped, print_tools,
};
use crate::bundler::Bundler;
use crate::cli::{BuildArgs, RuntimeConfig};
use crate::error::Result;

/// Execute build command
pub(super) async fn execute_build(args: &BuildArgs, config: &RuntimeConfig) -> Result<i32> {
    let build_config = load_build_config(args)?;

    config.section("Preflight");
    let bundler = Bundler::new(build_config);
    let prepared = bundler.prepare()?;
    print_tools(prepared.verified(), config);
    print_dropped(prepared.dropped(), config);
    config.success_println(&format!(
        "Inputs verified for '{}' ({}, {})",
        prepared.config().executable_name(),
        prepared.config().mode().flag().trim_start_matches("--"),
        prepared.config().platform()
    ));

    config.section("Build");
    config.progress(&format!(
        "{} {}",
        prepared.program().display(),
        prepared.args()
    ));

    let outcome = prepared.execute().await;
    print_cleanup(&outcome.cleanup, config);

    let result = outcome.into_result()?;
    config.success_println("Artifact verified");
    print_build_summary(&result, config);

    Ok(0)
}
