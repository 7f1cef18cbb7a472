//! Vitrine HTTP layer
//!
//! Wraps the page routes with the request-context middleware, serves static
//! assets and health checks, and owns the listener lifecycle.

pub mod config;
pub mod middleware;
pub mod server;

pub use config::ServerConfig;
pub use middleware::establish_request_context;
pub use server::{HttpServer, ServerError, build_router};
