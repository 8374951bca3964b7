//! `vc-tools list`.

use std::path::Path;

use anyhow::Result;
use vctools_core::ProjectConfig;
use vctools_tasks::{description, Settings};

use crate::formatting::{print_task_table, TaskRow};

use super::pipeline;

pub fn cmd_list(cwd: &Path, json: bool) -> Result<()> {
    // Listing works without a manifest; task actions never run here.
    let project = ProjectConfig::load(cwd).unwrap_or_default();
    let graph = pipeline(Settings::new(cwd, project));

    if json {
        let tasks: Vec<serde_json::Value> = graph
            .tasks()
            .map(|task| {
                serde_json::json!({
                    "name": task.name,
                    "dependencies": task.dependencies,
                    "description": description(&task.name),
                    "watch": graph.watch_spec(&task.name).map(|spec| &spec.target),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }

    let rows: Vec<TaskRow<'_>> = graph
        .tasks()
        .map(|task| TaskRow {
            name: &task.name,
            dependencies: &task.dependencies,
            summary: description(&task.name).unwrap_or_default(),
        })
        .collect();
    print_task_table(&rows);
    Ok(())
}
