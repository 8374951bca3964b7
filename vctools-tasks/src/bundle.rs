//! Webpack bundles for examples (`webpack`) and distributable builds (`dist`).

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{error, info};
use vctools_core::TaskError;
use walkdir::WalkDir;

use crate::compile::{babel_config, write_tool_config, write_tool_file, ModuleFormat};
use crate::settings::Settings;

/// Project-provided webpack configuration, used by `dist` when present.
pub const PROJECT_WEBPACK_CONFIG: &str = "webpack.config.js";

#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    pub name: String,
    #[serde(default)]
    pub size: u64,
}

/// The parts of `webpack --json` output we report on.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub errors: Vec<Value>,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub children: Vec<Stats>,
}

impl Stats {
    /// Parses stats, tolerating log lines printed before the JSON document.
    pub fn parse(output: &str) -> Result<Self, TaskError> {
        let start = output
            .find('{')
            .ok_or_else(|| TaskError::message("webpack produced no stats"))?;
        serde_json::from_str(&output[start..])
            .map_err(|e| TaskError::message(format!("Invalid webpack stats: {}", e)))
    }

    /// Errors from this compilation and every child compilation.
    pub fn all_errors(&self) -> Vec<Value> {
        let mut errors = self.errors.clone();
        for child in &self.children {
            errors.extend(child.all_errors());
        }
        errors
    }

    pub fn all_assets(&self) -> Vec<&Asset> {
        let mut assets: Vec<&Asset> = self.assets.iter().collect();
        for child in &self.children {
            assets.extend(child.all_assets());
        }
        assets
    }

    /// Prints the generated assets, then fails with the bundler's errors.
    pub fn report(&self) -> Result<(), TaskError> {
        let errors = self.all_errors();
        for err in &errors {
            error!("error {}", err);
        }
        for asset in self.all_assets() {
            info!("generated {} {}", asset.name, format_kb(asset.size));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(TaskError::Tool {
                tool: "webpack".to_string(),
                payload: Value::Array(errors),
            })
        }
    }
}

pub fn format_kb(bytes: u64) -> String {
    format!("{:.2}kB", bytes as f64 / 1024.0)
}

async fn run_webpack(settings: &Settings, extra: &[&str]) -> Result<Stats, TaskError> {
    let command = settings.npx("webpack").arg("--json").args(extra.iter().copied());
    let output = command.output().await?;
    let stats = Stats::parse(&output.stdout);

    match stats {
        Ok(stats) => {
            stats.report()?;
            if output.success {
                Ok(stats)
            } else {
                Err(TaskError::Exit {
                    command: command.to_string(),
                    code: output.code,
                })
            }
        }
        Err(_) if !output.success => Err(TaskError::Exit {
            command: command.to_string(),
            code: output.code,
        }),
        Err(e) => Err(e),
    }
}

/// Bundles the examples into `build/examples`.
pub async fn bundle_examples(settings: &Settings) -> Result<(), TaskError> {
    if !settings.path("examples").is_dir() {
        info!("No examples directory, skipping bundle");
        return Ok(());
    }
    run_webpack(settings, &["--output-path", "build/examples"]).await?;
    Ok(())
}

/// Sizes of every file below `dir`, keyed by relative path.
pub fn measure_sizes(dir: &Path) -> BTreeMap<String, u64> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let relative = e.path().strip_prefix(dir).ok()?.to_string_lossy().replace('\\', "/");
            let size = e.metadata().ok()?.len();
            Some((relative, size))
        })
        .collect()
}

/// One line per file: size and the change since the previous build.
pub fn size_report(before: &BTreeMap<String, u64>, after: &BTreeMap<String, u64>) -> Vec<String> {
    after
        .iter()
        .map(|(name, &size)| {
            let delta = match before.get(name) {
                Some(&previous) if previous != size => {
                    let diff = size as i64 - previous as i64;
                    let sign = if diff > 0 { "+" } else { "-" };
                    format!(" ({}{})", sign, format_kb(diff.unsigned_abs()))
                }
                Some(_) => String::new(),
                None => " (new)".to_string(),
            };
            format!("{:>10}{}  dist/{}", format_kb(size), delta, name)
        })
        .collect()
}

/// Output options for the UMD bundles. `config.output` from
/// `package.json` wins; a `null` value removes the default.
fn dist_output(settings: &Settings) -> Map<String, Value> {
    let mut output = Map::new();
    output.insert("path".into(), json!(settings.path("dist").display().to_string()));
    output.insert("filename".into(), json!("[name].js"));
    output.insert("library".into(), json!(settings.project.name));
    output.insert("libraryTarget".into(), json!("umd"));
    output.insert("libraryExport".into(), json!("default"));

    for (key, value) in settings.project.config.output.iter().flatten() {
        if value.is_null() {
            output.remove(key);
        } else {
            output.insert(key.clone(), value.clone());
        }
    }
    output
}

/// The `dist` multi-compiler config: a readable build of every entry and
/// a minified `<entry>.min` build. `None` without `config.entry`.
pub fn dist_configs(settings: &Settings) -> Option<Value> {
    let entry = settings.project.config.entry.as_ref()?;
    let output = dist_output(settings);
    let config = |entry: Value, minimize: bool| {
        json!({
            "mode": "production",
            "context": settings.cwd.display().to_string(),
            "devtool": false,
            "entry": entry,
            "output": output,
            "externals": {
                "vue": { "root": "Vue", "commonjs2": "vue", "commonjs": "vue", "amd": "vue" },
            },
            "resolve": { "extensions": [".js", ".jsx", ".json"] },
            "optimization": { "minimize": minimize },
        })
    };

    let minified: Map<String, Value> = entry
        .iter()
        .map(|(name, path)| (format!("{}.min", name), path.clone()))
        .collect();
    Some(json!([
        config(json!(entry), false),
        config(Value::Object(minified), true),
    ]))
}

/// Wraps `configs` in a webpack config module adding the loaders, which
/// need regular expressions and so cannot live in JSON.
pub fn dist_config_module(configs: &Value, babel_config: &Path) -> Result<String, TaskError> {
    let configs = serde_json::to_string_pretty(configs)
        .map_err(|e| TaskError::message(format!("Invalid dist config: {}", e)))?;
    let babel_config = serde_json::to_string(&babel_config.display().to_string())
        .map_err(|e| TaskError::message(format!("Invalid babel config path: {}", e)))?;
    Ok(format!(
        r#"const babelOptions = require({babel_config});
const rules = [
  {{ test: /\.jsx?$/, exclude: /node_modules/, loader: 'babel-loader', options: babelOptions }},
  {{ test: /\.css$/, use: ['style-loader', 'css-loader'] }},
  {{ test: /\.less$/, use: ['style-loader', 'css-loader', 'less-loader'] }},
];
module.exports = {configs}.map(config => Object.assign(config, {{ module: {{ rules }} }}));
"#
    ))
}

/// Webpack arguments for `dist`: the project's own config when it has
/// one, otherwise the generated UMD config. `None` without `config.entry`.
pub fn dist_args(settings: &Settings) -> Result<Option<Vec<String>>, TaskError> {
    let Some(configs) = dist_configs(settings) else {
        return Ok(None);
    };
    if settings.path(PROJECT_WEBPACK_CONFIG).is_file() {
        return Ok(Some(
            ["--env", "phase=dist", "--output-path", "dist"]
                .map(String::from)
                .to_vec(),
        ));
    }

    let babel = write_tool_config(
        settings,
        "babel.dist.json",
        &babel_config(ModuleFormat::CommonJs, settings.babel_runtime),
    )?;
    let module = dist_config_module(&configs, &babel)?;
    let path = write_tool_file(settings, "webpack.dist.js", &module)?;
    Ok(Some(vec!["--config".to_string(), path.display().to_string()]))
}

/// Builds the UMD bundles for `config.entry` into `dist/`.
pub async fn build_dist(settings: &Settings) -> Result<(), TaskError> {
    let Some(args) = dist_args(settings)? else {
        info!("No config.entry in package.json, skipping dist");
        return Ok(());
    };

    let dist = settings.path("dist");
    let before = measure_sizes(&dist);
    match fs::remove_dir_all(&dist) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e.into()),
        _ => {}
    }

    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    run_webpack(settings, &args).await?;

    for line in size_report(&before, &measure_sizes(&dist)) {
        info!("{}", line);
    }
    Ok(())
}
