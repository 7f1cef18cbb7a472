//! The ambient request — what templates and helpers know about the
//! in-flight HTTP request without receiving it as a parameter.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use axum::http::request::Parts;
use serde::Serialize;
use uuid::Uuid;
use vitrine_context::{ContextError, ContextVar};

/// Header set by htmx on requests issued from the page.
const HX_REQUEST: &str = "hx-request";
/// Id of the element htmx will swap the response into.
const HX_TARGET: &str = "hx-target";

/// Snapshot of the in-flight request, exposed to templates as `request`.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentRequest {
    /// Unique id for log correlation.
    pub id: Uuid,
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    /// Path plus query string.
    pub url: String,
    /// Lowercased header names; values that are not valid UTF-8 are dropped.
    pub headers: BTreeMap<String, String>,
    /// True when the page asked for a fragment rather than a full document.
    pub partial: bool,
    pub target: Option<String>,
}

impl CurrentRequest {
    pub fn from_parts(parts: &Parts) -> Self {
        let headers: BTreeMap<String, String> = parts
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();

        let mut request = Self::new(parts.method.as_str(), parts.uri.path());
        request.query = parts.uri.query().map(str::to_string);
        request.url = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| request.path.clone());
        request.partial = headers
            .get(HX_REQUEST)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
        request.target = headers.get(HX_TARGET).cloned();
        request.headers = headers;
        request
    }

    /// A bare request with no query string or headers.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            id: Uuid::new_v4(),
            method: method.into(),
            url: path.clone(),
            path,
            query: None,
            headers: BTreeMap::new(),
            partial: false,
            target: None,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// The request currently being handled by this execution context.
pub static CURRENT_REQUEST: LazyLock<ContextVar<CurrentRequest>> =
    LazyLock::new(|| ContextVar::new("current_request"));

/// Shorthand for `CURRENT_REQUEST.get()`.
pub fn current_request() -> Result<Arc<CurrentRequest>, ContextError> {
    CURRENT_REQUEST.get()
}
