//! Page handler errors and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};
use vitrine_render::RenderError;

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// A file name did not follow the expected naming scheme.
    #[error("malformed file name `{name}`: {reason}")]
    MalformedName { name: String, reason: &'static str },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl ViewError {
    pub fn malformed(name: impl Into<String>, reason: &'static str) -> Self {
        Self::MalformedName {
            name: name.into(),
            reason,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedName { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Pattern(_) | Self::Io(_) | Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Render(e) => e.into_response(),
            other if status.is_server_error() => {
                error!("Page failed: {other}");
                (status, other.to_string()).into_response()
            }
            other => {
                warn!("Rejected request: {other}");
                (status, other.to_string()).into_response()
            }
        }
    }
}
