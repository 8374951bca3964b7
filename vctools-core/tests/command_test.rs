#![cfg(unix)]

use std::sync::Arc;

use tempfile::TempDir;
use vctools_core::{Action, Command, TaskError, TaskGraph, TaskRunner};

#[tokio::test]
async fn test_successful_command() {
    let result = Command::new("sh").args(["-c", "echo hello"]).run().await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_exit_code_is_forwarded() {
    let err = Command::new("sh")
        .args(["-c", "echo oops >&2; exit 3"])
        .run()
        .await
        .unwrap_err();

    match err {
        TaskError::Exit { command, code } => {
            assert_eq!(code, Some(3));
            assert!(command.starts_with("sh -c"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_non_utf8_output_is_not_a_failure() {
    let command = Command::new("sh").args([
        "-c",
        "printf 'ok \\377\\n' >&2; printf 'ok \\377\\nnext'; exit 0",
    ]);

    assert!(command.run().await.is_ok());

    let output = command.output().await.unwrap();
    assert!(output.success);
    assert_eq!(output.stdout, "ok \u{FFFD}\nnext\n");
}

#[tokio::test]
async fn test_missing_program() {
    let err = Command::new("vctools-definitely-not-installed")
        .run()
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to spawn"));
}

#[tokio::test]
async fn test_output_captures_stdout() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("marker.txt"), "x").unwrap();

    let output = Command::new("sh")
        .args(["-c", "ls; echo $VCTOOLS_TEST"])
        .current_dir(temp_dir.path())
        .env("VCTOOLS_TEST", "from-env")
        .output()
        .await
        .unwrap();

    assert!(output.success);
    assert_eq!(output.code, Some(0));
    assert!(output.stdout.contains("marker.txt"));
    assert!(output.stdout.contains("from-env"));
}

#[tokio::test]
async fn test_command_as_task_action() {
    let temp_dir = TempDir::new().unwrap();
    let mut graph = TaskGraph::new();
    graph.register_task(
        "touch",
        Vec::<String>::new(),
        Arc::new(
            Command::new("sh")
                .args(["-c", "touch built.txt"])
                .current_dir(temp_dir.path()),
        ),
    );
    graph.register_task(
        "check",
        ["touch"],
        Arc::new(
            Command::new("sh")
                .args(["-c", "test -f built.txt"])
                .current_dir(temp_dir.path()),
        ),
    );

    let report = TaskRunner::new(Arc::new(graph)).run("check").await.unwrap();
    assert!(report.is_success());
}
