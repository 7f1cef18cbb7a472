//! Vitrine view rendering.
//!
//! Handlers produce plain serializable view models; the [`Renderer`] turns
//! them into HTML using the request installed in [`CURRENT_REQUEST`] by the
//! HTTP middleware, so neither handlers nor helper code have to pass the
//! request around.

pub mod engine;
pub mod error;
pub mod model;
pub mod renderer;
pub mod request;

pub use engine::{JinjaTemplates, STATIC_PREFIX, TemplateEngine};
pub use error::RenderError;
pub use model::{MODEL_KEY, to_context};
pub use renderer::{Rendered, Renderer, ViewFuture, wrap};
pub use request::{CURRENT_REQUEST, CurrentRequest, current_request};
