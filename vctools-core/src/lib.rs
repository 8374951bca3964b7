//! Core library for the vc-tools build pipeline: a task graph with
//! dependency resolution, a sequential runner, and watch mode.

pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod graph;
pub mod runner;
pub mod task;
pub mod watch;
pub mod watcher;

pub use command::{Command, CommandOutput};
pub use config::ProjectConfig;
pub use error::{Error, Result, TaskError};
pub use event::{Observer, Phase, TaskEvent};
pub use graph::{ExecutionPlan, TaskGraph, WatchSpec};
pub use runner::{InvocationReport, TaskResult, TaskRunner};
pub use task::{from_async, from_fn, noop, Action, ActionResult, Task, TaskState};
pub use watch::watch;
pub use watcher::{ChangeFilter, ChangeSource, FileWatcher, WatcherConfig};
