//! Dev server for component examples.
//!
//! Requests for `examples/<name>.html` are rendered on the fly from the
//! sibling `.tsx`, `.ts`, `.jsx` or `.js` source. Everything else is served
//! as static files from the project root.

pub mod config;
pub mod highlight;
pub mod render;
pub mod server;
pub mod source;

pub use config::{resolve_port, ServerConfig, DEFAULT_PORT, PORT_ENV};
pub use render::{ExampleRenderer, RenderError, TEMPLATE_OVERRIDE};
pub use server::{create_router, serve, AppState, ServeError};
pub use source::{find_source, ExampleSource, SourceKind};
