//! Project configuration read from `package.json`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

pub const MANIFEST_FILE: &str = "package.json";

/// The parts of `package.json` the toolchain reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,
    #[serde(default)]
    pub config: PackageSettings,
}

/// The `config` block of `package.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageSettings {
    /// Dev server port; npm allows both `8001` and `"8001"`.
    #[serde(default, deserialize_with = "deserialize_port")]
    pub port: Option<u16>,
    /// Bundle entry points for the `dist` build.
    #[serde(default)]
    pub entry: Option<BTreeMap<String, serde_json::Value>>,
    /// Extra bundler output options for the `dist` build.
    #[serde(default)]
    pub output: Option<serde_json::Map<String, serde_json::Value>>,
}

fn deserialize_port<'de, D>(deserializer: D) -> std::result::Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u16::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid port: {}", n))),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("Invalid port: {}", s))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "Port must be a number or string, got {}",
            other
        ))),
    }
}

impl ProjectConfig {
    /// Loads `package.json` from `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or is not valid JSON.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        let content = fs::read_to_string(&path).map_err(|e| Error::Config {
            path: path.clone(),
            message: format!("Failed to read: {}", e),
        })?;
        Self::parse(&content).map_err(|e| match e {
            Error::Json(e) => Error::Config {
                path,
                message: e.to_string(),
            },
            other => other,
        })
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    #[inline]
    pub fn has_script(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }
}
