//! Shared helpers for the build, preview and clean commands.

use crate::bundler::{
    self, BuildConfig, BuildResult, CleanupReport, Context, DroppedInput, SettingsBuilder,
    SettingsFile, VerifiedConfig,
};
use crate::cli::{BuildArgs, RuntimeConfig};
use path_absolutize::Absolutize;
use std::path::Path;

/// Builds the run configuration: config file first, then environment and flags.
pub(super) fn load_build_config(args: &BuildArgs) -> bundler::Result<BuildConfig> {
    let mut builder = SettingsBuilder::new();

    if let Some(path) = &args.config {
        let file = SettingsFile::load(path)
            .with_context(|| format!("loading config file {}", path.display()))?;
        builder = builder.apply_file(file);
    }

    if let Some(script) = &args.script {
        builder = builder.script(script);
    }
    if let Some(name) = &args.name {
        builder = builder.executable_name(name);
    }
    if let Some(mode) = args.selected_mode() {
        builder = builder.mode(mode);
    }
    if let Some(icon) = &args.icon {
        builder = builder.icon(icon);
    }
    if let Some(platform) = args.platform {
        builder = builder.platform(platform);
    }
    if let Some(dir) = &args.project_dir {
        builder = builder.project_dir(dir);
    }
    if let Some(tool) = &args.tool {
        builder = builder.tool(tool);
    }
    if let Some(policy) = args.missing_data {
        builder = builder.missing_data(policy);
    }
    if args.keep_build {
        builder = builder.keep_build(true);
    }
    for tool in &args.required_tools {
        builder = builder.required_tool(tool);
    }

    builder
        .hidden_imports(args.hidden_imports.iter().cloned())
        .data_mappings(args.data_mappings()?)
        .build()
}

/// Absolute form of `path` for display; falls back to the path as given.
pub(super) fn display_path(path: &Path) -> String {
    match path.absolutize() {
        Ok(absolute) => absolute.display().to_string(),
        Err(_) => path.display().to_string(),
    }
}

/// Human-readable byte count.
pub(super) fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

pub(super) fn print_tools(verified: &VerifiedConfig, config: &RuntimeConfig) {
    for tool in verified.tools() {
        config.verbose_println(&format!(
            "{} → {} ({})",
            tool.name,
            tool.path.display(),
            tool.version.as_deref().unwrap_or("version unknown")
        ));
    }
}

pub(super) fn print_dropped(dropped: &[DroppedInput], config: &RuntimeConfig) {
    for input in dropped {
        config.warning_println(&input.to_string());
    }
}

pub(super) fn print_cleanup(report: &CleanupReport, config: &RuntimeConfig) {
    if report.retained {
        config.warning_println("Cleanup disabled: build/ and the .spec descriptor were retained");
        return;
    }

    for path in &report.removed {
        config.verbose_println(&format!("Removed {}", path.display()));
    }
    for (path, reason) in &report.failed {
        config.warning_println(&format!("Could not remove {}: {}", path.display(), reason));
    }
    if report.is_clean() {
        config.verbose_println("Transient build state cleaned up");
    }
}

pub(super) fn print_build_summary(result: &BuildResult, config: &RuntimeConfig) {
    config.section("Summary");
    config.field("artifact", &display_path(&result.output_path));
    config.field("size", &format_size(result.summary.size));
    if let Some(checksum) = &result.summary.checksum {
        config.field("sha256", checksum);
    }
    if !result.dropped.is_empty() {
        config.field("dropped", &result.dropped.len().to_string());
        for input in &result.dropped {
            config.indent(&input.to_string());
        }
    }
}
