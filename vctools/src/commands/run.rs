//! `vc-tools run <task>`.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use vctools_core::{watch, FileWatcher, TaskRunner, WatchSpec, WatcherConfig};

use crate::formatting::{
    format_duration, print_error, print_key_value, print_section_header, print_success, print_warning,
    SectionStyle,
};
use crate::RunArgs;

use super::reporter::{ConsoleReporter, JsonReporter};
use super::{load_project, pipeline, settings};

/// Runs `task`; returns whether the invocation succeeded.
pub async fn cmd_run(cwd: &Path, task: &str, args: &RunArgs) -> Result<bool> {
    let project = load_project(cwd)?;
    let graph = Arc::new(pipeline(settings(cwd, project, args)));

    let runner = if args.json {
        TaskRunner::new(Arc::clone(&graph)).with_observer(JsonReporter)
    } else {
        println!("vc-tools run {}", task);
        TaskRunner::new(Arc::clone(&graph)).with_observer(ConsoleReporter)
    };

    let report = match runner.run(task).await?.into_result() {
        Ok(report) => report,
        Err(e) => {
            if !args.json {
                print_error(&e.to_string());
            }
            return Ok(false);
        }
    };
    if !args.json {
        print_success(&format!(
            "{} task(s) finished in {}",
            report.executed(),
            format_duration(report.duration)
        ));
    }

    if let Some(spec) = graph.watch_spec(task) {
        watch_mode(cwd, &runner, spec).await?;
    }
    Ok(true)
}

async fn watch_mode(cwd: &Path, runner: &TaskRunner, spec: &WatchSpec) -> Result<()> {
    let config = WatcherConfig {
        root: cwd.to_path_buf(),
        patterns: spec.patterns.clone(),
        ..WatcherConfig::default()
    };
    let filter = config.filter()?;
    let mut watcher = FileWatcher::new(&filter)?;

    print_section_header("Watch Mode", SectionStyle::Primary);
    print_key_value("Patterns", &spec.patterns.join(", "));
    print_key_value("Task", &spec.target);
    println!("  Press Ctrl+C to stop");
    println!();

    tokio::select! {
        result = watch(runner, &spec.target, &filter, &mut watcher, config.debounce()) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            println!();
            print_warning("Stopping watch mode...");
        }
    }
    Ok(())
}
