//! Error types and result aliases.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Task not found: {name}. Available tasks: {available}")]
    UnknownTask { name: String, available: String },

    #[error("Task '{task}' depends on '{dependency}', which is not registered")]
    UnknownDependency { task: String, dependency: String },

    #[error("Circular task dependency detected: {}", format_cycle(members))]
    Cycle { members: Vec<String> },

    #[error("Task '{task}' failed after {duration:?}: {source}")]
    TaskFailed {
        task: String,
        duration: Duration,
        #[source]
        source: TaskError,
    },

    #[error("Config error in {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Invalid watch pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("Watcher error: {0}")]
    Watcher(String),
}

/// Failure signalled by a task action.
///
/// The payload of an external tool is carried as-is so the caller can print
/// exactly what the tool reported.
#[derive(Error, Debug, Clone)]
pub enum TaskError {
    #[error("{0}")]
    Message(String),

    #[error("`{command}` exited with {}", exit_label(*code))]
    Exit { command: String, code: Option<i32> },

    #[error("{tool} failed: {payload}")]
    Tool {
        tool: String,
        payload: serde_json::Value,
    },
}

fn format_cycle(members: &[String]) -> String {
    let mut path = members.to_vec();
    if let Some(first) = members.first() {
        path.push(first.clone());
    }
    path.join(" -> ")
}

fn exit_label(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "a signal".to_string(),
    }
}

impl TaskError {
    pub fn message(message: impl Into<String>) -> Self {
        TaskError::Message(message.into())
    }
}

impl From<std::io::Error> for TaskError {
    fn from(error: std::io::Error) -> Self {
        TaskError::Message(error.to_string())
    }
}

impl From<Error> for TaskError {
    fn from(error: Error) -> Self {
        TaskError::Message(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
