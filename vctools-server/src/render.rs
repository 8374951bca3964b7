//! Example page rendering.

use std::collections::BTreeMap;
use std::fs;
use std::net::{IpAddr, UdpSocket};
use std::path::{Path, PathBuf};

use minijinja::{context, Environment};
use regex::Regex;
use thiserror::Error;
use vctools_core::ProjectConfig;

use crate::highlight::highlight;
use crate::source::{has_stylesheet, ExampleSource};

/// Project-level template override, relative to the project root.
pub const TEMPLATE_OVERRIDE: &str = "examples/template.html";

const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ pkg.name }} - {{ name }}</title>
  {%- if has_css %}
  <link rel="stylesheet" href="./{{ name }}.css">
  {%- endif %}
</head>
<body>
  <h1>{{ pkg.name }}@{{ pkg.version }} - {{ name }}</h1>
  <div id="qrcode"></div>
  <div id="__react-content"></div>
  {{ content | safe }}
  <script src="./common.js"></script>
  <script src="./{{ name }}.js"></script>
</body>
</html>
"#;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Renders example sources into standalone HTML pages.
///
/// Shared by the dev server and the `build` task.
#[derive(Debug, Clone)]
pub struct ExampleRenderer {
    template: String,
    pkg_name: String,
    pkg_version: String,
    port: u16,
    /// Address baked into QR codes; the page's own hostname when unset.
    host: Option<IpAddr>,
    src_path: Option<Regex>,
}

/// The IPv4 address other devices on the network reach this machine at.
///
/// Connecting a UDP socket sends nothing; it only selects the outbound
/// interface.
pub fn lan_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (!ip.is_loopback() && !ip.is_unspecified()).then_some(ip)
}

impl ExampleRenderer {
    /// Creates a renderer for the project at `root`, picking up
    /// `examples/template.html` when present. QR codes point at the
    /// machine's LAN address.
    pub fn new(root: &Path, project: &ProjectConfig, port: u16) -> Result<Self, RenderError> {
        let override_path = root.join(TEMPLATE_OVERRIDE);
        let renderer = if override_path.is_file() {
            Self::from_template_file(&override_path, project, port)?
        } else {
            Self::with_template(DEFAULT_TEMPLATE, project, port)
        };
        Ok(renderer.with_host(lan_ip()))
    }

    pub fn from_template_file(
        path: &Path,
        project: &ProjectConfig,
        port: u16,
    ) -> Result<Self, RenderError> {
        let template = fs::read_to_string(path).map_err(|source| RenderError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::with_template(template, project, port))
    }

    pub fn with_template(template: impl Into<String>, project: &ProjectConfig, port: u16) -> Self {
        let src_path = if project.name.is_empty() {
            None
        } else {
            Regex::new(&format!(r#"(["']{})/src/"#, regex::escape(&project.name))).ok()
        };
        Self {
            template: template.into(),
            pkg_name: project.name.clone(),
            pkg_version: project.version.clone(),
            port,
            host: None,
            src_path,
        }
    }

    pub fn with_host(mut self, host: Option<IpAddr>) -> Self {
        self.host = host;
        self
    }

    /// Protocol-relative page URL as a JavaScript expression.
    fn page_address(&self, name: &str) -> String {
        match self.host {
            Some(host) => format!("'//{}:{}/examples/{}.html'", host, self.port, name),
            None => format!(
                "'//' + location.hostname + ':{}/examples/{}.html'",
                self.port, name
            ),
        }
    }

    /// Rewrites `'<pkg>/src/...` imports to the published `lib` layout.
    pub fn replace_src_to_lib(&self, code: &str) -> String {
        match &self.src_path {
            Some(re) => re.replace_all(code, "${1}/lib/").into_owned(),
            None => code.to_string(),
        }
    }

    fn content(&self, name: &str, source: &ExampleSource, code: &str) -> String {
        let code = self.replace_src_to_lib(code);
        let address = self.page_address(name);
        format!(
            r#"
    <script>
        document.getElementById("qrcode").appendChild(new QRCode({{text: location.protocol + {address}}}));
    </script>
    <div class="highlight">
      <pre><code>{}</code></pre>
    </div>
"#,
            highlight(source.kind, &code)
        )
    }

    /// Renders one example page.
    pub fn render(
        &self,
        source: &ExampleSource,
        query: &BTreeMap<String, String>,
    ) -> Result<String, RenderError> {
        let code = fs::read_to_string(&source.path).map_err(|e| RenderError::Read {
            path: source.path.clone(),
            source: e,
        })?;
        let name = source.name();

        let mut env = Environment::new();
        env.add_template("example.html", &self.template)?;
        let template = env.get_template("example.html")?;

        let html = template.render(context! {
            name => name,
            has_css => has_stylesheet(&source.path),
            pkg => context! { name => &self.pkg_name, version => &self.pkg_version },
            query => query,
            content => self.content(name, source, &code),
        })?;
        Ok(html)
    }
}
