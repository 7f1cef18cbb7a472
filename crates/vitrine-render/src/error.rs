//! Rendering errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;
use vitrine_context::ContextError;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Rendering was attempted outside of request handling.
    #[error("no request in context: {0}")]
    ContextMissing(#[from] ContextError),

    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// The template exists but failed to compile or render.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("view model is not serializable: {0}")]
    Model(#[from] serde_json::Error),
}

impl IntoResponse for RenderError {
    fn into_response(self) -> Response {
        error!("Render failed: {self}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Internal Server Error: {self}"),
        )
            .into_response()
    }
}
