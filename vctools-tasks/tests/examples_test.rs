use std::fs;
use std::path::Path;

use tempfile::TempDir;
use vctools_core::ProjectConfig;
use vctools_tasks::examples::{build_examples, select_examples};
use vctools_tasks::Settings;

fn touch(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn test_select_examples() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    for name in [
        "simple.js",
        "typed.tsx",
        "typed.js",
        "typed.jsx",
        "~scratch.js",
        "style.less",
        "template.html",
        "other.jsx",
    ] {
        touch(dir, name, "");
    }

    let names: Vec<String> = select_examples(dir)
        .unwrap()
        .iter()
        .map(|s| s.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();

    assert_eq!(names, ["other.jsx", "simple.js", "typed.tsx"]);
}

#[test]
fn test_build_renders_pages() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let examples = root.join("examples");
    fs::create_dir_all(&examples).unwrap();
    touch(&examples, "simple.js", "import X from 'rc-demo/src/X';");
    touch(&examples, "~draft.js", "");

    let project = ProjectConfig::parse(r#"{ "name": "rc-demo", "version": "1.0.0" }"#).unwrap();
    let rendered = build_examples(&Settings::new(root, project)).unwrap();

    assert_eq!(rendered, 1);
    let html = fs::read_to_string(root.join("build/examples/simple.html")).unwrap();
    assert!(html.contains("rc-demo/lib/X"));
    assert!(!root.join("build/examples/~draft.html").exists());
}

#[test]
fn test_build_without_examples() {
    let temp_dir = TempDir::new().unwrap();
    let rendered = build_examples(&Settings::new(temp_dir.path(), ProjectConfig::default())).unwrap();
    assert_eq!(rendered, 0);
}
