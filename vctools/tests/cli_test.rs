use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn vc_tools(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_vc-tools"))
        .arg("--cwd")
        .arg(cwd)
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute vc-tools")
}

fn project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("package.json"),
        r#"{ "name": "rc-demo", "version": "1.0.0" }"#,
    )
    .unwrap();
    temp_dir
}

#[test]
fn test_run_without_task_prints_help() {
    let temp_dir = project();
    let output = vc_tools(temp_dir.path(), &["run"]);

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("vc-tools run server"));
}

#[test]
fn test_unknown_task_fails() {
    let temp_dir = project();
    let output = vc_tools(temp_dir.path(), &["run", "deploy"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Task not found: deploy"));
}

#[test]
fn test_clean_emits_json_events() {
    let temp_dir = project();
    fs::create_dir_all(temp_dir.path().join("lib")).unwrap();
    fs::create_dir_all(temp_dir.path().join("build")).unwrap();

    let output = vc_tools(temp_dir.path(), &["run", "clean", "--json"]);

    assert!(output.status.success());
    let events: Vec<serde_json::Value> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["task"], "clean");
    assert_eq!(events[0]["phase"], "start");
    assert_eq!(events[1]["phase"], "stop");
    assert!(events[1]["duration"].as_f64().is_some());
    assert!(!temp_dir.path().join("lib").exists());
    assert!(!temp_dir.path().join("build").exists());
}

#[test]
fn test_failing_task_exits_non_zero() {
    let temp_dir = project();
    let output = Command::new(env!("CARGO_BIN_EXE_vc-tools"))
        .arg("--cwd")
        .arg(temp_dir.path())
        .args(["run", "guard", "--json"])
        .env("npm_config_argv", r#"{"original":["publish"]}"#)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(r#""phase":"error""#));
}

#[test]
fn test_run_requires_manifest() {
    let temp_dir = TempDir::new().unwrap();
    let output = vc_tools(temp_dir.path(), &["run", "clean"]);
    assert!(!output.status.success());
}

#[test]
fn test_list_json() {
    let temp_dir = TempDir::new().unwrap();
    let output = vc_tools(temp_dir.path(), &["list", "--json"]);

    assert!(output.status.success());
    let tasks: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    let watch = tasks.iter().find(|t| t["name"] == "watch").unwrap();
    assert_eq!(watch["dependencies"][0], "compile_watch");
    assert_eq!(watch["watch"], "compile_watch");
}
