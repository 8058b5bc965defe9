//! End-to-end packaging runs against a simulated packaging tool.

#![cfg(unix)]

use kodegen_bundler_pyinstaller::bundler::{
    BuildMode, Bundler, DataMapping, DroppedInput, Error, MissingDataPolicy, Platform,
    SettingsBuilder, SettingsFile,
};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/packager.toml");

/// Writes an executable shell script standing in for the packaging tool.
///
/// Every variant answers `--version`, records its arguments to `args.txt` and
/// leaves the usual transient state behind before running `tail`.
fn fake_tool(dir: &Path, tail: &str) -> PathBuf {
    let path = dir.join("fake-pyinstaller");
    let script = format!(
        r##"#!/bin/sh
case "$1" in --version) echo "fake-pyinstaller 6.0"; exit 0;; esac
printf '%s\n' "$@" > args.txt
name=""
mode=file
while [ $# -gt 0 ]; do
  case "$1" in
    --name) name="$2"; shift;;
    --onedir) mode=dir;;
  esac
  shift
done
mkdir -p "build/$name"
echo "# generated" > "$name.spec"
{tail}
"##
    );
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A tool that produces the artifact, appending `suffix` in single-file mode.
fn succeeding_tool(dir: &Path, suffix: &str) -> PathBuf {
    fake_tool(
        dir,
        &format!(
            r#"mkdir -p dist
if [ "$mode" = dir ]; then
  mkdir -p "dist/$name" && echo bin > "dist/$name/$name"
else
  printf 'bin' > "dist/$name{suffix}"
fi
exit 0"#
        ),
    )
}

/// Project directory holding the file_server sources.
fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("server.py"), "print('serving')\n").unwrap();
    fs::create_dir_all(dir.path().join("static")).unwrap();
    fs::write(dir.path().join("static/index.html"), "<html></html>").unwrap();
    dir
}

fn file_server(dir: &TempDir, tool: &Path) -> SettingsBuilder {
    SettingsBuilder::new()
        .project_dir(dir.path())
        .script("server.py")
        .executable_name("file_server")
        .hidden_imports(["psutil", "markdown"])
        .data(DataMapping::new("static", "static"))
        .tool(tool.display().to_string())
}

fn recorded_args(dir: &TempDir) -> Vec<String> {
    fs::read_to_string(dir.path().join("args.txt"))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

fn file_server_args() -> Vec<String> {
    [
        "--name",
        "file_server",
        "--onefile",
        "--hidden-import",
        "psutil",
        "--hidden-import",
        "markdown",
        "--add-data",
        "static:static",
        "server.py",
    ]
    .map(String::from)
    .to_vec()
}

fn assert_transient_state_removed(dir: &TempDir) {
    assert!(!dir.path().join("build").exists(), "build/ left behind");
    assert!(!dir.path().join("file_server.spec").exists(), "descriptor left behind");
}

#[tokio::test]
async fn single_file_build_on_unix() {
    let dir = project();
    let tool = succeeding_tool(dir.path(), "");

    let config = file_server(&dir, &tool)
        .platform(Platform::Unix)
        .build()
        .unwrap();
    let result = Bundler::new(config).package().await.unwrap();

    assert_eq!(result.exit_code, 0);
    assert!(result.artifact_confirmed);
    assert_eq!(result.output_path, dir.path().join("dist/file_server"));
    assert_eq!(result.summary.size, 3);
    assert!(result.summary.checksum.is_some());
    assert!(result.dropped.is_empty());

    assert_eq!(recorded_args(&dir), file_server_args());
    assert_transient_state_removed(&dir);
    assert!(dir.path().join("server.py").exists());
    assert!(dir.path().join("static/index.html").exists());
}

#[tokio::test]
async fn single_file_build_for_windows() {
    let dir = project();
    let tool = succeeding_tool(dir.path(), ".exe");

    let config = file_server(&dir, &tool)
        .platform(Platform::Windows)
        .build()
        .unwrap();
    let result = Bundler::new(config).package().await.unwrap();

    assert_eq!(result.output_path, dir.path().join("dist/file_server.exe"));
    assert!(recorded_args(&dir).contains(&"static;static".to_string()));
    assert_transient_state_removed(&dir);
}

#[tokio::test]
async fn directory_build_summarizes_tree() {
    let dir = project();
    let tool = succeeding_tool(dir.path(), "");

    let config = file_server(&dir, &tool)
        .mode(BuildMode::Directory)
        .platform(Platform::Unix)
        .build()
        .unwrap();
    let result = Bundler::new(config).package().await.unwrap();

    assert_eq!(result.output_path, dir.path().join("dist/file_server"));
    assert!(result.output_path.is_dir());
    assert!(result.summary.checksum.is_none());
    assert!(recorded_args(&dir).contains(&"--onedir".to_string()));
    assert_transient_state_removed(&dir);
}

#[tokio::test]
async fn missing_data_source_is_dropped() {
    let dir = project();
    fs::remove_dir_all(dir.path().join("static")).unwrap();
    let tool = succeeding_tool(dir.path(), "");

    let config = file_server(&dir, &tool)
        .platform(Platform::Unix)
        .build()
        .unwrap();
    let result = Bundler::new(config).package().await.unwrap();

    assert_eq!(
        result.dropped,
        [DroppedInput::Data(DataMapping::new("static", "static"))]
    );
    let args = recorded_args(&dir);
    assert!(!args.contains(&"--add-data".to_string()));
    assert_eq!(args.last().map(String::as_str), Some("server.py"));
}

#[tokio::test]
async fn missing_data_source_fails_under_strict_policy() {
    let dir = project();
    fs::remove_dir_all(dir.path().join("static")).unwrap();
    let tool = succeeding_tool(dir.path(), "");

    let config = file_server(&dir, &tool)
        .missing_data(MissingDataPolicy::Fail)
        .build()
        .unwrap();
    let err = Bundler::new(config).package().await.unwrap_err();

    assert!(matches!(err, Error::InputMissing { what: "data source", .. }));
    assert!(!dir.path().join("args.txt").exists(), "tool ran after preflight failure");
}

#[tokio::test]
async fn failing_tool_still_cleans_up() {
    let dir = project();
    let tool = fake_tool(dir.path(), "exit 1");

    let config = file_server(&dir, &tool).build().unwrap();
    let outcome = Bundler::new(config).prepare().unwrap().execute().await;

    assert_eq!(outcome.cleanup.removed.len(), 2);
    let err = outcome.into_result().unwrap_err();
    assert!(matches!(err, Error::BuildFailed { code: Some(1), .. }));
    assert_eq!(err.exit_code(), 1);
    assert_transient_state_removed(&dir);
    assert!(!dir.path().join("dist/file_server").exists());
}

#[tokio::test]
async fn tool_exit_code_is_preserved() {
    let dir = project();
    let tool = fake_tool(dir.path(), "exit 4");

    let config = file_server(&dir, &tool).build().unwrap();
    let err = Bundler::new(config).package().await.unwrap_err();

    assert_eq!(err.exit_code(), 4);
}

#[tokio::test]
async fn success_without_artifact_is_a_failure() {
    let dir = project();
    let tool = fake_tool(dir.path(), "exit 0");

    let config = file_server(&dir, &tool).build().unwrap();
    let outcome = Bundler::new(config).prepare().unwrap().execute().await;

    assert!(outcome.cleanup.is_clean());
    let err = outcome.into_result().unwrap_err();
    assert!(matches!(err, Error::ArtifactMissing { .. }));
    assert_transient_state_removed(&dir);
}

#[tokio::test]
async fn keep_build_retains_transient_state() {
    let dir = project();
    let tool = succeeding_tool(dir.path(), "");

    let config = file_server(&dir, &tool).keep_build(true).build().unwrap();
    let outcome = Bundler::new(config).prepare().unwrap().execute().await;

    assert!(outcome.cleanup.retained);
    assert!(outcome.into_result().is_ok());
    assert!(dir.path().join("build/file_server").exists());
    assert!(dir.path().join("file_server.spec").exists());
}

#[tokio::test]
async fn abandoned_run_cleans_up() {
    let dir = project();
    let tool = fake_tool(dir.path(), "sleep 30");

    let config = file_server(&dir, &tool).build().unwrap();
    let prepared = Bundler::new(config).prepare().unwrap();

    let spawned = dir.path().join("file_server.spec");
    let run = prepared.execute();
    let wait_for_tool = async {
        while !spawned.exists() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    };

    // Drop the run once the tool has left its state behind.
    tokio::select! {
        _ = run => panic!("tool should still be running"),
        _ = wait_for_tool => {}
    }

    assert_transient_state_removed(&dir);
}

#[tokio::test]
async fn missing_tool_fails_before_anything_runs() {
    let dir = project();

    let config = SettingsBuilder::new()
        .project_dir(dir.path())
        .script("server.py")
        .executable_name("file_server")
        .tool("definitely-not-a-packaging-tool")
        .build()
        .unwrap();
    let err = Bundler::new(config).package().await.unwrap_err();

    assert!(err.is_preflight());
    match err {
        Error::ToolMissing { tool, .. } => assert_eq!(tool, "definitely-not-a-packaging-tool"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[tokio::test]
async fn fixture_config_builds() {
    let dir = project();
    fs::copy(FIXTURE, dir.path().join("packager.toml")).unwrap();
    let tool = succeeding_tool(dir.path(), "");

    let file = SettingsFile::load(&dir.path().join("packager.toml")).unwrap();
    let config = SettingsBuilder::new()
        .apply_file(file)
        .tool(tool.display().to_string())
        .platform(Platform::Unix)
        .build()
        .unwrap();
    assert_eq!(config.project_dir(), dir.path());

    let result = Bundler::new(config).package().await.unwrap();
    assert_eq!(result.output_path, dir.path().join("dist/file_server"));
    assert_eq!(recorded_args(&dir), file_server_args());
}
