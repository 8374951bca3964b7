//! Task lifecycle events for progress reporting.

use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Start,
    Stop,
    Error,
}

/// Emitted when a task starts, finishes, or fails.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskEvent {
    pub task: String,
    pub phase: Phase,
    /// Wall-clock time spent in the task; `None` for start events.
    #[serde(serialize_with = "serialize_duration")]
    pub duration: Option<Duration>,
    /// Failure payload for error events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn serialize_duration<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match duration {
        Some(d) => serializer.serialize_some(&d.as_secs_f64()),
        None => serializer.serialize_none(),
    }
}

impl TaskEvent {
    pub fn start(task: &str) -> Self {
        Self {
            task: task.to_string(),
            phase: Phase::Start,
            duration: None,
            error: None,
        }
    }

    pub fn stop(task: &str, duration: Duration) -> Self {
        Self {
            task: task.to_string(),
            phase: Phase::Stop,
            duration: Some(duration),
            error: None,
        }
    }

    pub fn error(task: &str, duration: Duration, error: String) -> Self {
        Self {
            task: task.to_string(),
            phase: Phase::Error,
            duration: Some(duration),
            error: Some(error),
        }
    }
}

/// Receives task events. Observers only watch; they cannot steer execution.
pub trait Observer: Send + Sync {
    fn on_event(&self, event: &TaskEvent);
}

impl<F> Observer for F
where
    F: Fn(&TaskEvent) + Send + Sync,
{
    fn on_event(&self, event: &TaskEvent) {
        self(event)
    }
}
