use std::fs;

use tempfile::TempDir;
use vctools_core::ProjectConfig;
use vctools_tasks::lint::{eslint_config, lint_targets, BUNDLED_ESLINT_CONFIG};
use vctools_tasks::Settings;

#[test]
fn test_bundled_config_is_valid_json() {
    let config: serde_json::Value = serde_json::from_str(BUNDLED_ESLINT_CONFIG).unwrap();
    assert_eq!(config["parser"], "babel-eslint");
}

#[test]
fn test_project_eslintrc_wins() {
    let temp_dir = TempDir::new().unwrap();
    let settings = Settings::new(temp_dir.path(), ProjectConfig::default());

    let bundled = eslint_config(&settings).unwrap();
    assert_eq!(bundled, temp_dir.path().join(".vc-tools/eslintrc.json"));

    fs::write(temp_dir.path().join(".eslintrc"), "{}").unwrap();
    assert_eq!(eslint_config(&settings).unwrap(), temp_dir.path().join(".eslintrc"));
}

#[test]
fn test_lint_targets_skip_missing_dirs() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("components")).unwrap();
    fs::create_dir_all(temp_dir.path().join("examples")).unwrap();

    let mut settings = Settings::new(temp_dir.path(), ProjectConfig::default());
    settings.src = "components".to_string();

    assert_eq!(lint_targets(&settings), ["components", "examples"]);
}
