//! Task progress output.

use owo_colors::OwoColorize;
use vctools_core::{Observer, Phase, TaskEvent};

use crate::formatting::{format_duration, Status};

/// Prints `Starting 'x'...` / `Finished 'x' after ...` lines.
pub struct ConsoleReporter;

impl Observer for ConsoleReporter {
    fn on_event(&self, event: &TaskEvent) {
        let task = format!("'{}'", event.task.cyan());
        let marker = Status::from(event.phase).marker();
        let took = event.duration.map(format_duration).unwrap_or_default();
        match event.phase {
            Phase::Start => println!("{} Starting {}...", marker, task),
            Phase::Stop => println!(
                "{} Finished {} after {}",
                marker,
                task,
                took.magenta()
            ),
            Phase::Error => {
                eprintln!(
                    "{} {} {} after {}",
                    marker,
                    task,
                    "errored".red(),
                    took.magenta()
                );
                if let Some(error) = &event.error {
                    eprintln!("    {}", error.red());
                }
            }
        }
    }
}

/// Prints one JSON object per event.
pub struct JsonReporter;

impl Observer for JsonReporter {
    fn on_event(&self, event: &TaskEvent) {
        match serde_json::to_string(event) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::warn!("failed to serialize event: {}", e),
        }
    }
}
