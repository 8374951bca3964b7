use std::fs;

use tempfile::TempDir;
use vctools_core::{Error, ProjectConfig};

#[test]
fn test_parse_manifest() {
    let json = r#"{
        "name": "rc-calendar",
        "version": "9.0.0-beta.1",
        "scripts": { "pre-publish": "npm test" },
        "config": {
            "port": "8001",
            "entry": { "rc-calendar": ["./index.js"] }
        }
    }"#;

    let config = ProjectConfig::parse(json).unwrap();
    assert_eq!(config.name, "rc-calendar");
    assert_eq!(config.version, "9.0.0-beta.1");
    assert!(config.has_script("pre-publish"));
    assert!(!config.has_script("pre-gh-pages"));
    assert_eq!(config.config.port, Some(8001));
    assert!(config.config.entry.unwrap().contains_key("rc-calendar"));
    assert!(config.config.output.is_none());
}

#[test]
fn test_parse_manifest_defaults() {
    let config = ProjectConfig::parse(r#"{ "name": "x" }"#).unwrap();
    assert_eq!(config.version, "");
    assert!(config.scripts.is_empty());
    assert!(config.config.port.is_none());
    assert!(config.config.entry.is_none());
}

#[test]
fn test_numeric_port() {
    let config = ProjectConfig::parse(r#"{ "config": { "port": 9000 } }"#).unwrap();
    assert_eq!(config.config.port, Some(9000));
}

#[test]
fn test_invalid_port() {
    assert!(ProjectConfig::parse(r#"{ "config": { "port": "abc" } }"#).is_err());
    assert!(ProjectConfig::parse(r#"{ "config": { "port": 70000 } }"#).is_err());
}

#[test]
fn test_load_from_directory() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("package.json"),
        r#"{ "name": "demo", "version": "1.0.0" }"#,
    )
    .unwrap();

    let config = ProjectConfig::load(temp_dir.path()).unwrap();
    assert_eq!(config.name, "demo");
}

#[test]
fn test_load_missing_manifest() {
    let temp_dir = TempDir::new().unwrap();
    let err = ProjectConfig::load(temp_dir.path()).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn test_load_invalid_manifest() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("package.json"), "{ not json").unwrap();

    let err = ProjectConfig::load(temp_dir.path()).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}
