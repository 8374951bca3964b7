//! Dev server configuration.

use std::path::PathBuf;

use vctools_core::ProjectConfig;

/// Environment variable npm sets from `package.json` `config.port`.
pub const PORT_ENV: &str = "npm_package_config_port";

pub const DEFAULT_PORT: u16 = 8000;

/// Dev server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory served as the site root.
    pub root: PathBuf,
    /// Bind address.
    pub bind_address: String,
    /// Port number.
    pub port: u16,
    /// Page template; `examples/template.html` or the built-in one if unset.
    pub template: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            bind_address: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            template: None,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_bind_address(mut self, address: impl Into<String>) -> Self {
        self.bind_address = address.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_template(mut self, template: impl Into<PathBuf>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Returns the bind address as a string.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Picks the port: explicit flag, then `npm_package_config_port`, then
/// `config.port` from `package.json`, then 8000.
pub fn resolve_port(flag: Option<u16>, project: &ProjectConfig) -> u16 {
    let env = std::env::var(PORT_ENV).ok();
    port_from(flag, env.as_deref(), project)
}

fn port_from(flag: Option<u16>, env: Option<&str>, project: &ProjectConfig) -> u16 {
    if let Some(port) = flag {
        return port;
    }
    if let Some(raw) = env {
        match raw.trim().parse() {
            Ok(port) => return port,
            Err(_) => tracing::warn!("Ignoring invalid {}: {:?}", PORT_ENV, raw),
        }
    }
    project.config.port.unwrap_or(DEFAULT_PORT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_precedence() {
        let project = ProjectConfig::parse(r#"{ "config": { "port": 8001 } }"#).unwrap();

        assert_eq!(port_from(Some(9000), Some("8002"), &project), 9000);
        assert_eq!(port_from(None, Some("8002"), &project), 8002);
        assert_eq!(port_from(None, None, &project), 8001);
        assert_eq!(port_from(None, Some("nope"), &project), 8001);
        assert_eq!(port_from(None, None, &ProjectConfig::default()), DEFAULT_PORT);
    }

    #[test]
    fn test_bind_addr() {
        let config = ServerConfig::new().with_bind_address("127.0.0.1").with_port(8123);
        assert_eq!(config.bind_addr(), "127.0.0.1:8123");
    }
}
