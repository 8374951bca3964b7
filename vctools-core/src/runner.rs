//! Task execution engine.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::error::{Error, Result, TaskError};
use crate::event::{Observer, TaskEvent};
use crate::graph::TaskGraph;
use crate::task::TaskState;

/// Runs one root task and its dependencies, strictly one task at a time.
///
/// Every call to [`TaskRunner::run`] is a fresh invocation: the plan is
/// resolved again and every task in it runs again.
pub struct TaskRunner {
    graph: Arc<TaskGraph>,
    observers: Vec<Arc<dyn Observer>>,
}

impl TaskRunner {
    pub fn new(graph: Arc<TaskGraph>) -> Self {
        Self {
            graph,
            observers: Vec::new(),
        }
    }

    pub fn with_observer(mut self, observer: impl Observer + 'static) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    #[inline]
    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    fn emit(&self, event: TaskEvent) {
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }

    /// Runs `root` after all of its transitive dependencies.
    ///
    /// Stops at the first failing task; tasks after it stay pending and
    /// nothing that already ran is undone.
    ///
    /// # Errors
    ///
    /// Returns an error only for configuration problems (unknown task,
    /// unknown dependency, cycle), which are detected before any task runs.
    /// Task failures are reported through [`InvocationReport`].
    pub async fn run(&self, root: &str) -> Result<InvocationReport> {
        let plan = self.graph.resolve(root)?;
        debug!(task = root, order = ?plan.order(), "resolved execution plan");

        let started = Instant::now();
        let mut results: Vec<TaskResult> = plan
            .order()
            .iter()
            .map(|name| TaskResult {
                task: name.clone(),
                state: TaskState::Pending,
                duration: None,
                error: None,
            })
            .collect();

        for result in results.iter_mut() {
            let task = self
                .graph
                .get(&result.task)
                .ok_or_else(|| Error::UnknownTask {
                    name: result.task.clone(),
                    available: String::new(),
                })?;

            result.state = TaskState::Running;
            self.emit(TaskEvent::start(&result.task));

            let start = Instant::now();
            let outcome = task.action().run().await;
            let duration = start.elapsed();
            result.duration = Some(duration);

            match outcome {
                Ok(()) => {
                    result.state = TaskState::Succeeded;
                    self.emit(TaskEvent::stop(&result.task, duration));
                }
                Err(e) => {
                    error!(task = %result.task, ?duration, "task failed: {}", e);
                    result.state = TaskState::Failed;
                    self.emit(TaskEvent::error(&result.task, duration, e.to_string()));
                    result.error = Some(e);
                    break;
                }
            }
        }

        let report = InvocationReport {
            root: root.to_string(),
            results,
            duration: started.elapsed(),
        };
        info!(
            task = root,
            executed = report.executed(),
            success = report.is_success(),
            "invocation finished"
        );
        Ok(report)
    }
}

/// Per-task outcome within one invocation.
#[derive(Debug, Clone)]
pub struct TaskResult {
    pub task: String,
    pub state: TaskState,
    pub duration: Option<Duration>,
    pub error: Option<TaskError>,
}

/// Result set of one invocation, in execution order.
#[derive(Debug, Clone)]
pub struct InvocationReport {
    pub root: String,
    pub results: Vec<TaskResult>,
    pub duration: Duration,
}

impl InvocationReport {
    pub fn is_success(&self) -> bool {
        self.results
            .iter()
            .all(|r| r.state == TaskState::Succeeded)
    }

    /// The task that halted the invocation, if any.
    pub fn failure(&self) -> Option<&TaskResult> {
        self.results.iter().find(|r| r.state == TaskState::Failed)
    }

    /// Number of tasks whose action was started.
    pub fn executed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.state != TaskState::Pending)
            .count()
    }

    pub fn state_of(&self, task: &str) -> Option<TaskState> {
        self.results
            .iter()
            .find(|r| r.task == task)
            .map(|r| r.state)
    }

    /// Converts a failed invocation into [`Error::TaskFailed`].
    pub fn into_result(self) -> Result<Self> {
        if let Some(failed) = self.failure() {
            return Err(Error::TaskFailed {
                task: failed.task.clone(),
                duration: failed.duration.unwrap_or_default(),
                source: failed
                    .error
                    .clone()
                    .unwrap_or_else(|| TaskError::message("Task failed")),
            });
        }
        Ok(self)
    }
}
