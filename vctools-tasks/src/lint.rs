//! Dependency check, linting and formatting.

use std::io;
use std::path::PathBuf;

use tracing::info;
use vctools_core::{Action, TaskError};

use crate::compile::CONFIG_DIR;
use crate::settings::Settings;

/// Lint configuration used when the project has no `.eslintrc`.
pub const BUNDLED_ESLINT_CONFIG: &str = include_str!("../config/eslintrc.json");

const PRETTIER_GLOBS: [&str; 3] = [
    "src/**/*.{js,jsx}",
    "tests/**/*.{js,jsx}",
    "examples/**/*.{js,jsx}",
];

pub async fn check_deps(settings: &Settings) -> Result<(), TaskError> {
    if !settings.check_deps {
        return Ok(());
    }
    settings
        .command(settings.npm())
        .args(["ls", "--depth=0"])
        .run()
        .await
}

/// The project's `.eslintrc`, or the bundled config written to `.vc-tools/`.
pub fn eslint_config(settings: &Settings) -> io::Result<PathBuf> {
    let project = settings.path(".eslintrc");
    if project.exists() {
        return Ok(project);
    }
    let dir = settings.path(CONFIG_DIR);
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("eslintrc.json");
    std::fs::write(&path, BUNDLED_ESLINT_CONFIG)?;
    Ok(path)
}

/// Directories handed to eslint, skipping ones the project lacks.
pub fn lint_targets(settings: &Settings) -> Vec<String> {
    [settings.src.as_str(), "tests", "examples"]
        .into_iter()
        .filter(|dir| settings.path(dir).is_dir())
        .map(str::to_string)
        .collect()
}

pub async fn js_lint(settings: &Settings) -> Result<(), TaskError> {
    if !settings.js_lint {
        info!("js-lint disabled");
        return Ok(());
    }
    let targets = lint_targets(settings);
    if targets.is_empty() {
        return Ok(());
    }
    let config = eslint_config(settings)?;

    let mut eslint = settings
        .npx("eslint")
        .args(["-c".to_string(), config.display().to_string()])
        .args(["--ext", ".js,.jsx"])
        .args(targets);
    if settings.fix {
        eslint = eslint.arg("--fix");
    }
    eslint.run().await
}

pub async fn prettier(settings: &Settings) -> Result<(), TaskError> {
    settings
        .npx("prettier")
        .args([
            "--print-width",
            "100",
            "--single-quote",
            "--trailing-comma",
            "all",
            "--no-error-on-unmatched-pattern",
            "--write",
        ])
        .args(PRETTIER_GLOBS)
        .run()
        .await
}
