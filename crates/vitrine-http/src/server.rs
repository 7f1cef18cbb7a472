//! HTTP server using Axum.
//!
//! Assembles the page router with the context middleware, static assets and
//! the health check, then serves it until asked to stop.

use axum::{Json, Router, middleware, response::IntoResponse, routing::get};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use vitrine_render::STATIC_PREFIX;

use crate::config::ServerConfig;
use crate::middleware::establish_request_context;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Layer the shared stack over `pages`.
///
/// Every route, including static assets, runs inside the request context
/// middleware; the trace layer sits outermost.
pub fn build_router(pages: Router, config: &ServerConfig) -> Router {
    pages
        .route("/healthz", get(health_handler))
        .nest_service(STATIC_PREFIX, ServeDir::new(&config.static_dir))
        .layer(middleware::from_fn(establish_request_context))
        .layer(TraceLayer::new_for_http())
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// A running server.
pub struct HttpServer {
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
    port: u16,
}

impl HttpServer {
    /// Bind and start serving `app` in the background.
    pub async fn start(config: &ServerConfig, app: Router) -> Result<Self, ServerError> {
        let address = config.address();
        let listener = TcpListener::bind((config.hostname.as_str(), config.port))
            .await
            .map_err(|source| ServerError::Bind {
                address: address.clone(),
                source,
            })?;
        let actual_port = listener.local_addr()?.port();

        info!("Vitrine listening on http://{}:{}", config.hostname, actual_port);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = result {
                error!("HTTP server error: {e}");
            }
        });

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
            port: actual_port,
        })
    }

    /// Get the actual bound port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Gracefully stop the server, waiting for in-flight requests.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        info!("Vitrine server stopped");
    }
}
