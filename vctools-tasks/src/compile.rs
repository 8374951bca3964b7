//! Compilation of component sources into `lib`, `es` and `assets`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::{Captures, Regex};
use serde_json::{json, Value};
use tracing::{debug, info};
use vctools_core::{Action, TaskError};
use walkdir::WalkDir;

use crate::settings::Settings;

/// Scratch directory for generated tool configuration.
pub const CONFIG_DIR: &str = ".vc-tools";

/// Non-script files copied verbatim next to the compiled modules.
const ASSET_EXTENSIONS: [&str; 3] = ["png", "svg", "less"];

/// Module format produced by a babel pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleFormat {
    /// CommonJS output in `lib`.
    CommonJs,
    /// ES module output in `es`.
    Es,
}

impl ModuleFormat {
    pub fn out_dir(self) -> &'static str {
        match self {
            ModuleFormat::CommonJs => "lib",
            ModuleFormat::Es => "es",
        }
    }

    fn modules(self) -> Value {
        match self {
            ModuleFormat::CommonJs => json!("commonjs"),
            ModuleFormat::Es => json!(false),
        }
    }
}

/// Babel configuration for one pass.
pub fn babel_config(format: ModuleFormat, runtime: bool) -> Value {
    let mut plugins = vec![
        json!("transform-vue-jsx"),
        json!("transform-es3-member-expression-literals"),
        json!("transform-es3-property-literals"),
        json!("transform-object-assign"),
    ];
    if runtime {
        plugins.push(json!(["transform-runtime", { "polyfill": false }]));
    }

    json!({
        "babelrc": false,
        "presets": [
            ["env", {
                "modules": format.modules(),
                "exclude": ["transform-es2015-typeof-symbol"],
            }],
            "stage-0",
        ],
        "plugins": plugins,
    })
}

/// Writes `value` as pretty JSON to `.vc-tools/<name>` and returns the path.
pub fn write_tool_config(settings: &Settings, name: &str, value: &Value) -> io::Result<PathBuf> {
    let content = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    write_tool_file(settings, name, &content)
}

/// Writes `content` to `.vc-tools/<name>` and returns the path.
pub fn write_tool_file(settings: &Settings, name: &str, content: &str) -> io::Result<PathBuf> {
    let dir = settings.path(CONFIG_DIR);
    fs::create_dir_all(&dir)?;
    let path = dir.join(name);
    fs::write(&path, content)?;
    Ok(path)
}

/// Matches `'<pkg>/assets/<name>.less'` imports.
pub fn less_import_pattern(package: &str) -> Option<Regex> {
    Regex::new(&format!(
        r#"(["']{})/assets/([^.'"]+)\.less"#,
        regex::escape(package)
    ))
    .ok()
}

/// Points stylesheet imports at the compiled `.css`.
pub fn rewrite_less_imports(pattern: &Regex, code: &str) -> String {
    pattern.replace_all(code, "${1}/assets/${2}.css").into_owned()
}

fn is_script(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == "js")
}

/// Matches the start of a quoted `<pkg>/lib/...` module path.
pub fn lib_import_pattern() -> Option<Regex> {
    Regex::new(r#"(?P<quote>["'])(?P<pkg>(?:@[\w.-]+/)?\w[\w.-]*)/lib/"#).ok()
}

/// Points `<pkg>/lib/...` imports at `<pkg>/es/...` for every package
/// `has_es` accepts.
pub fn rewrite_lib_imports(pattern: &Regex, code: &str, has_es: impl Fn(&str) -> bool) -> String {
    pattern
        .replace_all(code, |caps: &Captures| {
            if has_es(&caps["pkg"]) {
                format!("{}{}/es/", &caps["quote"], &caps["pkg"])
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Rewrites every compiled script under `dir` with `rewrite`, returning
/// how many files changed.
fn rewrite_scripts(dir: &Path, rewrite: impl Fn(&str) -> String) -> io::Result<usize> {
    let mut rewritten = 0;
    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_script(path) {
            continue;
        }
        let code = fs::read_to_string(path)?;
        let updated = rewrite(&code);
        if updated != code {
            fs::write(path, updated)?;
            rewritten += 1;
        }
    }
    Ok(rewritten)
}

/// Applies [`rewrite_less_imports`] to every compiled script under `dir`.
pub fn rewrite_output(dir: &Path, package: &str) -> io::Result<usize> {
    let Some(pattern) = less_import_pattern(package) else {
        return Ok(0);
    };
    rewrite_scripts(dir, |code| rewrite_less_imports(&pattern, code))
}

/// Applies [`rewrite_lib_imports`] to the `es` output, for dependencies
/// under `node_modules` that ship an `es` build.
pub fn rewrite_es_output(dir: &Path, node_modules: &Path) -> io::Result<usize> {
    let Some(pattern) = lib_import_pattern() else {
        return Ok(0);
    };
    rewrite_scripts(dir, |code| {
        rewrite_lib_imports(&pattern, code, |pkg| node_modules.join(pkg).join("es").is_dir())
    })
}

/// Copies `png`, `svg` and `less` files from `src` into `dest`, keeping
/// the directory layout.
pub fn copy_assets(src: &Path, dest: &Path) -> io::Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(src).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        let is_asset = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| ASSET_EXTENSIONS.contains(&e));
        if !entry.file_type().is_file() || !is_asset {
            continue;
        }
        let Ok(relative) = path.strip_prefix(src) else {
            continue;
        };
        let target = dest.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(path, &target)?;
        copied += 1;
    }
    Ok(copied)
}

/// Recursively copies a directory tree.
pub fn copy_dir(src: &Path, dest: &Path) -> io::Result<()> {
    for entry in WalkDir::new(src).into_iter() {
        let entry = entry.map_err(io::Error::other)?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dest.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Compiles the source directory with babel into the format's output dir.
pub async fn babelify(settings: &Settings, format: ModuleFormat) -> Result<(), TaskError> {
    let config = babel_config(format, settings.babel_runtime);
    let config_path = write_tool_config(
        settings,
        &format!("babel.{}.json", format.out_dir()),
        &config,
    )?;

    let src = settings.path(&settings.src);
    let out = settings.path(format.out_dir());

    let mut babel = settings.npx("babel").args([
        settings.src.clone(),
        "--out-dir".to_string(),
        format.out_dir().to_string(),
        "--config-file".to_string(),
        config_path.display().to_string(),
        "--extensions".to_string(),
        ".js,.jsx".to_string(),
    ]);
    if settings.compress {
        babel = babel.arg("--minified");
    }
    babel.run().await?;

    let copied = copy_assets(&src, &out)?;
    let mut rewritten = rewrite_output(&out, &settings.project.name)?;
    if format == ModuleFormat::Es {
        rewritten += rewrite_es_output(&out, &settings.path("node_modules"))?;
    }
    debug!(copied, rewritten, "post-processed {}", out.display());
    Ok(())
}

/// `.less` entry points directly under `assets/`.
pub fn less_entries(settings: &Settings) -> io::Result<Vec<PathBuf>> {
    let assets = settings.path("assets");
    if !assets.is_dir() {
        return Ok(Vec::new());
    }
    let mut entries = Vec::new();
    for entry in fs::read_dir(&assets)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "less") {
            entries.push(path);
        }
    }
    entries.sort();
    Ok(entries)
}

/// Compiles `assets/*.less` to css, then autoprefixes the result.
pub async fn compile_css(settings: &Settings) -> Result<(), TaskError> {
    let entries = less_entries(settings)?;
    if entries.is_empty() {
        debug!("No stylesheets to compile");
        return Ok(());
    }

    let mut outputs = Vec::with_capacity(entries.len());
    for less in &entries {
        let css = less.with_extension("css");
        settings
            .npx("lessc")
            .args([less.display().to_string(), css.display().to_string()])
            .run()
            .await?;
        outputs.push(css.display().to_string());
    }

    settings
        .npx("postcss")
        .args(outputs)
        .args(["--use", "autoprefixer", "--no-map", "--replace"])
        .run()
        .await?;
    info!("Compiled {} stylesheet(s)", entries.len());
    Ok(())
}

/// Mirrors the compile output into `--out-dir` when one is given.
pub fn copy_to_out_dir(settings: &Settings) -> io::Result<()> {
    info!("file changed");
    let Some(out_dir) = &settings.out_dir else {
        return Ok(());
    };
    copy_dir(&settings.path("lib"), &out_dir.join("lib"))?;
    copy_dir(&settings.path("es"), &out_dir.join("es"))?;
    let assets = settings.path("assets");
    if assets.exists() {
        copy_dir(&assets, &out_dir.join("assets"))?;
    }
    info!("Copied compile output to {}", out_dir.display());
    Ok(())
}
