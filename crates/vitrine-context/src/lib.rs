//! Vitrine context variables.
//!
//! A [`ContextVar`] holds one value per execution context. Inside
//! [`ContextVar::scope`] the execution context is the surrounding tokio task;
//! outside of any scope it is the calling OS thread. Concurrent requests
//! multiplexed onto the same worker thread never observe each other's values.
//! On a tokio runtime, writes outside any scope fail with
//! [`ContextError::NoScope`] instead of landing in the shared thread frame.

pub mod error;
pub mod var;

pub use error::ContextError;
pub use var::{ContextGuard, ContextVar, Token};
