//! Options shared by every pipeline task.

use std::path::{Path, PathBuf};

use vctools_core::{Command, ProjectConfig};
use vctools_server::DEFAULT_PORT;

/// Project directory, manifest and command-line switches.
#[derive(Debug, Clone)]
pub struct Settings {
    pub cwd: PathBuf,
    pub project: ProjectConfig,
    /// Source directory, `src` unless overridden with `--src`.
    pub src: String,
    pub fix: bool,
    pub js_lint: bool,
    pub check_deps: bool,
    pub compress: bool,
    pub tnpm: bool,
    pub tag: Option<String>,
    pub out_dir: Option<PathBuf>,
    pub babel_runtime: bool,
    /// Port baked into example QR codes.
    pub port: u16,
}

impl Settings {
    pub fn new(cwd: impl Into<PathBuf>, project: ProjectConfig) -> Self {
        Self {
            cwd: cwd.into(),
            project,
            src: "src".to_string(),
            fix: false,
            js_lint: true,
            check_deps: true,
            compress: false,
            tnpm: false,
            tag: None,
            out_dir: None,
            babel_runtime: false,
            port: DEFAULT_PORT,
        }
    }

    /// Resolves `relative` against the project directory.
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.cwd.join(relative)
    }

    pub fn npm(&self) -> &'static str {
        if self.tnpm {
            "tnpm"
        } else {
            "npm"
        }
    }

    /// `npx <tool>` run from the project directory.
    pub fn npx(&self, tool: &str) -> Command {
        Command::new("npx").arg(tool).current_dir(&self.cwd)
    }

    /// Any program run from the project directory.
    pub fn command(&self, program: &str) -> Command {
        Command::new(program).current_dir(&self.cwd)
    }
}
