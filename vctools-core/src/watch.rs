//! Watch mode: re-run a task subgraph whenever matching files change.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::error::Result;
use crate::runner::TaskRunner;
use crate::watcher::{ChangeFilter, ChangeSource};

/// Re-invokes `target` for every debounced batch of matching changes.
///
/// Each re-run is a full invocation of `target` and all its dependencies;
/// nothing is skipped based on which file changed. A failed re-run is
/// logged and watching continues. Returns the number of re-runs once the
/// source is exhausted.
///
/// # Errors
///
/// Returns an error if `target` cannot be resolved, before any change is
/// consumed.
pub async fn watch<S>(
    runner: &TaskRunner,
    target: &str,
    filter: &ChangeFilter,
    source: &mut S,
    debounce: Duration,
) -> Result<usize>
where
    S: ChangeSource + ?Sized,
{
    runner.graph().resolve(target)?;

    let mut runs = 0;
    while let Some(paths) = source.next_change().await {
        let mut changed: Vec<PathBuf> = filter.select(paths);
        if changed.is_empty() {
            continue;
        }

        while let Ok(Some(more)) = tokio::time::timeout(debounce, source.next_change()).await {
            changed.extend(filter.select(more));
        }
        changed.sort();
        changed.dedup();

        info!(files = ?changed, "change detected, re-running '{}'", target);
        match runner.run(target).await {
            Ok(report) if report.is_success() => info!("rebuild complete, watching for changes..."),
            Ok(report) => {
                let task = report.failure().map(|f| f.task.as_str()).unwrap_or(target);
                warn!("rebuild failed in '{}', watching for changes...", task);
            }
            Err(e) => error!("failed to re-run '{}': {}", target, e),
        }
        runs += 1;
    }

    Ok(runs)
}
