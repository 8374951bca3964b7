//! File watching for watch-mode re-runs.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use glob::{MatchOptions, Pattern};
use notify::Config as NotifyConfig;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::{Error, Result};

pub struct WatcherConfig {
    pub debounce_ms: u64,
    pub root: PathBuf,
    pub patterns: Vec<String>,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            root: PathBuf::from("."),
            patterns: Vec::new(),
        }
    }
}

impl WatcherConfig {
    pub fn filter(&self) -> Result<ChangeFilter> {
        ChangeFilter::new(&self.root, &self.patterns)
    }

    #[inline]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Glob patterns matched against paths relative to a root directory.
///
/// A single `{a,b}` group per pattern is expanded, so `src/**/*.{js,jsx}`
/// is accepted alongside plain globs.
#[derive(Debug, Clone)]
pub struct ChangeFilter {
    root: PathBuf,
    patterns: Vec<Pattern>,
}

impl ChangeFilter {
    pub fn new(root: impl Into<PathBuf>, patterns: &[String]) -> Result<Self> {
        let mut compiled = Vec::new();
        for raw in patterns {
            for expanded in expand_braces(raw) {
                let pattern = Pattern::new(&expanded).map_err(|e| Error::Pattern {
                    pattern: raw.clone(),
                    message: e.to_string(),
                })?;
                compiled.push(pattern);
            }
        }

        Ok(Self {
            root: absolute(root.into()),
            patterns: compiled,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn matches(&self, path: &Path) -> bool {
        let path = without_cur_dir(path);
        let relative = path.strip_prefix(&self.root).unwrap_or(&path);
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        self.patterns
            .iter()
            .any(|pattern| pattern.matches_path_with(relative, options))
    }

    /// Keeps only the paths matched by at least one pattern.
    pub fn select(&self, paths: Vec<PathBuf>) -> Vec<PathBuf> {
        paths.into_iter().filter(|p| self.matches(p)).collect()
    }

    /// Directories that need watching: the literal prefix of each pattern.
    pub fn base_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = Vec::new();
        for pattern in &self.patterns {
            let mut base = self.root.clone();
            for component in Path::new(pattern.as_str()).components() {
                let Component::Normal(part) = component else {
                    continue;
                };
                let part = part.to_string_lossy();
                if part.contains(|c: char| matches!(c, '*' | '?' | '[' | '{')) {
                    break;
                }
                base.push(part.as_ref());
            }
            if base.is_file() {
                base.pop();
            }
            if !dirs.contains(&base) {
                dirs.push(base);
            }
        }
        dirs
    }
}

/// Anchors a relative root at the working directory so it lines up with
/// the absolute paths notify reports.
fn absolute(root: PathBuf) -> PathBuf {
    if root.is_absolute() {
        return without_cur_dir(&root);
    }
    match std::env::current_dir() {
        Ok(cwd) => without_cur_dir(&cwd.join(root)),
        Err(e) => {
            tracing::warn!("cannot resolve {}: {}", root.display(), e);
            without_cur_dir(&root)
        }
    }
}

fn without_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn expand_braces(pattern: &str) -> Vec<String> {
    let (Some(open), Some(close)) = (pattern.find('{'), pattern.find('}')) else {
        return vec![pattern.to_string()];
    };
    if close < open {
        return vec![pattern.to_string()];
    }

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];
    pattern[open + 1..close]
        .split(',')
        .map(|alt| format!("{}{}{}", prefix, alt, suffix))
        .collect()
}

/// Anything that yields batches of changed paths.
///
/// Returns `None` once no more changes can arrive.
#[async_trait]
pub trait ChangeSource: Send {
    async fn next_change(&mut self) -> Option<Vec<PathBuf>>;
}

#[async_trait]
impl ChangeSource for mpsc::UnboundedReceiver<Vec<PathBuf>> {
    async fn next_change(&mut self) -> Option<Vec<PathBuf>> {
        self.recv().await
    }
}

/// Recursive file-system watcher over the base directories of a filter.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    receiver: mpsc::UnboundedReceiver<Vec<PathBuf>>,
}

impl FileWatcher {
    pub fn new(filter: &ChangeFilter) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if matches!(event.kind, EventKind::Access(_)) {
                        return;
                    }
                    let _ = tx.send(event.paths);
                }
                Err(e) => tracing::warn!("watcher error: {}", e),
            },
            NotifyConfig::default(),
        )
        .map_err(|e| Error::Watcher(format!("Failed to create watcher: {}", e)))?;

        for dir in filter.base_dirs() {
            if !dir.exists() {
                tracing::warn!("not watching {}: directory does not exist", dir.display());
                continue;
            }
            tracing::info!("watching {}", dir.display());
            watcher
                .watch(&dir, RecursiveMode::Recursive)
                .map_err(|e| Error::Watcher(format!("Failed to watch directory: {}", e)))?;
        }

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
        })
    }
}

#[async_trait]
impl ChangeSource for FileWatcher {
    async fn next_change(&mut self) -> Option<Vec<PathBuf>> {
        self.receiver.recv().await
    }
}
