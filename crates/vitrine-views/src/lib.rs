//! Vitrine pages
//!
//! Each page handler returns a plain view model; [`app_router`] wraps them
//! with [`vitrine_render::wrap`] so the model is rendered with the page's
//! template against the ambient request.

pub mod account;
pub mod discovery;
pub mod error;
pub mod packages;
pub mod pagination;
pub mod videos;

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::services::ServeDir;
use vitrine_http::ServerConfig;
use vitrine_render::{Renderer, wrap};

pub use account::{AccountSettings, SettingsStore};
pub use error::ViewError;
pub use pagination::{PageQuery, Paginated, paginate};

/// Shared state for page handlers.
#[derive(Clone)]
pub struct AppState {
    pub renderer: Renderer,
    pub config: Arc<ServerConfig>,
    pub settings: Arc<SettingsStore>,
}

impl AppState {
    pub fn new(renderer: Renderer, config: ServerConfig) -> Self {
        Self {
            renderer,
            config: Arc::new(config),
            settings: Arc::new(SettingsStore::default()),
        }
    }
}

/// All page routes plus media files, with state applied.
pub fn app_router(state: AppState) -> Router {
    let r = &state.renderer;

    Router::new()
        .route("/", get(wrap(r.clone(), "home.html", videos::home)))
        .route("/videos", get(wrap(r.clone(), "videos.html", videos::gallery)))
        .route("/videos/{name}", get(wrap(r.clone(), "video.html", videos::detail)))
        .route("/packages", get(wrap(r.clone(), "packages.html", packages::listing)))
        .route(
            "/account",
            get(wrap(r.clone(), account::ACCOUNT_TEMPLATE, account::show)).post(account::update),
        )
        .nest_service(videos::MEDIA_PREFIX, ServeDir::new(&state.config.media_dir))
        .fallback(not_found)
        .with_state(state)
}

async fn not_found(State(state): State<AppState>) -> Response {
    match state.renderer.render_empty("404.html") {
        Ok(page) => page.with_status(StatusCode::NOT_FOUND).into_response(),
        Err(e) => e.into_response(),
    }
}
