//! Command implementations for the CLI.

mod list;
mod reporter;
mod run;
mod server;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use vctools_core::{ProjectConfig, TaskGraph};
use vctools_tasks::{register_pipeline, Settings};

use crate::RunArgs;

pub use list::cmd_list;
pub use run::cmd_run;
pub use server::cmd_server;

fn load_project(cwd: &Path) -> Result<ProjectConfig> {
    ProjectConfig::load(cwd).with_context(|| format!("Cannot load project in {}", cwd.display()))
}

fn settings(cwd: &Path, project: ProjectConfig, args: &RunArgs) -> Settings {
    let mut settings = Settings::new(cwd, project);
    settings.src = args.src.clone();
    settings.fix = args.fix;
    settings.js_lint = !args.no_js_lint;
    settings.check_deps = !args.no_check_deps;
    settings.compress = args.compress;
    settings.tnpm = args.tnpm;
    settings.tag = args.tag.clone();
    settings.out_dir = args.out_dir.clone();
    settings.babel_runtime = args.babel_runtime;
    settings.port = vctools_server::resolve_port(args.port, &settings.project);
    settings
}

fn pipeline(settings: Settings) -> TaskGraph {
    let mut graph = TaskGraph::new();
    register_pipeline(&mut graph, Arc::new(settings));
    graph
}
