//! HTTP API for Tessera.
//!
//! Provides an [`HttpServer`] that exposes the node's three data-plane
//! operations over an axum router:
//!
//! - `POST /upload`: multipart upload, file in the `document` field
//! - `GET /search?q=<keyword>`: exact keyword lookup
//! - `GET /download/{filename}`: reconstruct a file
//!
//! Responses are JSON except for successful downloads, which carry the
//! file body as `application/octet-stream`.

mod error;
mod handlers;


use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tessera_engine::TesseraNode;

pub use error::HttpError;

/// Default request body limit: 1 GiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 1024 * 1024 * 1024;

/// Shared application state for all handlers.
#[derive(Clone)]
pub(crate) struct AppState {
    /// The storage engine.
    pub node: Arc<TesseraNode>,
}

/// Configuration for creating an [`HttpServer`].
pub struct HttpServerConfig {
    /// The node to serve.
    pub node: Arc<TesseraNode>,
    /// Largest accepted request body, in bytes.
    pub max_upload_bytes: usize,
}

impl HttpServerConfig {
    /// Config with the default upload limit.
    pub fn new(node: Arc<TesseraNode>) -> Self {
        Self {
            node,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// HTTP server backed by a [`TesseraNode`].
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new server with the given configuration.
    pub fn new(config: HttpServerConfig) -> Self {
        let state = AppState { node: config.node };
        let router = Self::build_router(state, config.max_upload_bytes);
        Self { router }
    }

    fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
        Router::new()
            .route("/upload", post(handlers::upload))
            .route("/search", get(handlers::search))
            .route("/download/{filename}", get(handlers::download))
            .layer(DefaultBodyLimit::max(max_upload_bytes))
            .with_state(state)
    }

    /// Return the inner [`Router`] (useful for testing with `tower::ServiceExt`).
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Serve with graceful shutdown triggered by the given future.
    ///
    /// When `shutdown` completes, the server stops accepting new connections
    /// and waits for in-flight requests to finish.
    pub async fn serve_with_shutdown(
        self,
        addr: &str,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), std::io::Error> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(addr, "HTTP server listening");
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
