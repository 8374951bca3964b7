//! Task definitions and the action completion contract.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::TaskError;

/// Outcome of running a task action.
pub type ActionResult = std::result::Result<(), TaskError>;

/// Unit of work attached to a task.
///
/// Synchronous closures, futures and streaming subprocesses all resolve to
/// an [`ActionResult`], so the runner awaits every kind of action the same
/// way before moving on.
#[async_trait]
pub trait Action: Send + Sync {
    async fn run(&self) -> ActionResult;
}

/// Lifecycle of a task within one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl TaskState {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::Running => "running",
            TaskState::Succeeded => "succeeded",
            TaskState::Failed => "failed",
        }
    }
}

/// A named unit of work with its dependencies.
#[derive(Clone)]
pub struct Task {
    pub name: String,
    pub dependencies: Vec<String>,
    action: Arc<dyn Action>,
}

impl Task {
    pub fn new(name: impl Into<String>, dependencies: Vec<String>, action: Arc<dyn Action>) -> Self {
        Self {
            name: name.into(),
            dependencies,
            action,
        }
    }

    #[inline]
    pub fn action(&self) -> Arc<dyn Action> {
        Arc::clone(&self.action)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

struct Noop;

#[async_trait]
impl Action for Noop {
    async fn run(&self) -> ActionResult {
        Ok(())
    }
}

/// Action for tasks that only aggregate their dependencies.
pub fn noop() -> Arc<dyn Action> {
    Arc::new(Noop)
}

struct FnAction<F> {
    f: Arc<F>,
}

#[async_trait]
impl<F> Action for FnAction<F>
where
    F: Fn() -> ActionResult + Send + Sync + 'static,
{
    async fn run(&self) -> ActionResult {
        let f = Arc::clone(&self.f);
        tokio::task::spawn_blocking(move || f())
            .await
            .map_err(|e| TaskError::message(format!("Task panicked: {}", e)))?
    }
}

/// Wraps a blocking closure. It runs on the blocking pool so file-system
/// heavy work does not stall the runtime.
pub fn from_fn<F>(f: F) -> Arc<dyn Action>
where
    F: Fn() -> ActionResult + Send + Sync + 'static,
{
    Arc::new(FnAction { f: Arc::new(f) })
}

struct AsyncFnAction<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Action for AsyncFnAction<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ActionResult> + Send + 'static,
{
    async fn run(&self) -> ActionResult {
        (self.f)().await
    }
}

/// Wraps a closure returning a future.
pub fn from_async<F, Fut>(f: F) -> Arc<dyn Action>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ActionResult> + Send + 'static,
{
    Arc::new(AsyncFnAction { f })
}
