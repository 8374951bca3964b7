//! HTTP dev server.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    http::{Method, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    Router,
};
use thiserror::Error;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{debug, error, info};
use vctools_core::ProjectConfig;

use crate::config::ServerConfig;
use crate::render::{ExampleRenderer, RenderError};
use crate::source::{find_source, is_real_page};

/// Server state shared across requests.
#[derive(Clone)]
pub struct AppState {
    root: Arc<PathBuf>,
    renderer: Arc<ExampleRenderer>,
}

impl AppState {
    pub fn new(root: impl Into<PathBuf>, renderer: ExampleRenderer) -> Self {
        Self {
            root: Arc::new(root.into()),
            renderer: Arc::new(renderer),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Creates the HTTP router: example rendering in front of static files.
pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(state.root());
    Router::new()
        .fallback_service(static_files)
        .layer(middleware::from_fn_with_state(state, render_examples))
        .layer(TraceLayer::new_for_http())
}

/// Maps a request path onto the served directory, refusing to leave it.
fn local_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = Path::new(request_path.trim_start_matches('/'));
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(root.join(relative))
}

async fn render_examples(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !matches!(*request.method(), Method::GET | Method::HEAD)
        || !request.uri().path().ends_with(".html")
    {
        return next.run(request).await;
    }

    let Some(html_path) = local_path(state.root(), request.uri().path()) else {
        return next.run(request).await;
    };
    if is_real_page(&html_path) {
        return next.run(request).await;
    }
    let Some(source) = find_source(&html_path) else {
        debug!("No example source for {}", html_path.display());
        return next.run(request).await;
    };

    let query: BTreeMap<String, String> = Query::try_from_uri(request.uri())
        .map(|Query(q)| q)
        .unwrap_or_default();

    let renderer = Arc::clone(&state.renderer);
    let rendered = tokio::task::spawn_blocking(move || renderer.render(&source, &query)).await;

    match rendered {
        Ok(Ok(html)) => Html(html).into_response(),
        Ok(Err(e)) => ServerError::Render(e).into_response(),
        Err(e) => ServerError::Internal(e.to_string()).into_response(),
    }
}

/// Request-level failures.
#[derive(Debug)]
pub enum ServerError {
    Render(RenderError),
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = match self {
            ServerError::Render(e) => e.to_string(),
            ServerError::Internal(msg) => msg,
        };
        error!("Failed to render example: {}", message);
        (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
    }
}

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serves the project until `shutdown` resolves.
pub async fn serve<F>(config: ServerConfig, project: &ProjectConfig, shutdown: F) -> Result<(), ServeError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let renderer = match &config.template {
        Some(path) => ExampleRenderer::from_template_file(path, project, config.port)?,
        None => ExampleRenderer::new(&config.root, project, config.port)?,
    };
    let router = create_router(AppState::new(config.root.clone(), renderer));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServeError::Bind {
            addr: addr.clone(),
            source,
        })?;

    info!("Listening at http://localhost:{}", config.port);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Server stopped");
    Ok(())
}
