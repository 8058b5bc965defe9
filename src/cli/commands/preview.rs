//! Preview command implementation.
//!
//! Shows the exact command a build would run, where its artifact would land
//! and what cleanup would remove. Nothing is spawned and nothing is removed.

use super::helpers::{display_path, load_build_config, print_dropped};
use crate::bundler::{Bundler, PreparedBuild};
use crate::cli::{BuildArgs, RuntimeConfig};
use crate::error::Result;
use serde::Serialize;

/// Machine-readable preview
#[derive(Debug, Serialize)]
struct PreviewReport<'a> {
    tool: String,
    args: &'a crate::bundler::ArgumentVector,
    artifact: String,
    cleanup: Vec<String>,
    dropped: Vec<String>,
}

impl<'a> PreviewReport<'a> {
    fn new(prepared: &'a PreparedBuild) -> Self {
        Self {
            tool: prepared.program().display().to_string(),
            args: prepared.args(),
            artifact: display_path(&prepared.expected_artifact()),
            cleanup: prepared
                .transient_paths()
                .iter()
                .map(|p| display_path(p))
                .collect(),
            dropped: prepared.dropped().iter().map(ToString::to_string).collect(),
        }
    }
}

/// Execute preview command
pub(super) async fn execute_preview(
    args: &BuildArgs,
    json: bool,
    config: &RuntimeConfig,
) -> Result<()> {
    let build_config = load_build_config(args)?;
    let prepared = Bundler::new(build_config).prepare_inputs()?;

    if json {
        let report = PreviewReport::new(&prepared);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_dropped(prepared.dropped(), config);

    let report = PreviewReport::new(&prepared);
    config.section("Preview");
    config.field("command", &format!("{} {}", report.tool, report.args));
    config.field("artifact", &report.artifact);
    for path in &report.cleanup {
        config.field("cleanup", path);
    }
    if prepared.config().keep_build() {
        config.indent("(cleanup disabled: paths above will be retained)");
    }

    Ok(())
}
