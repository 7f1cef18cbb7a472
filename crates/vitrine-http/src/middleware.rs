//! Request context middleware.
//!
//! Installs the in-flight request as [`CURRENT_REQUEST`] for the rest of the
//! stack. The value lives in a task-local frame owned by this stage, so it is
//! gone once the response is produced, the handler fails, or the connection
//! drops the future.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{Instrument, debug, info_span};
use vitrine_render::{CURRENT_REQUEST, CurrentRequest};

pub async fn establish_request_context(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let current = CurrentRequest::from_parts(&parts);
    let request = Request::from_parts(parts, body);

    let span = info_span!(
        "request",
        id = %current.id,
        method = %current.method,
        path = %current.path,
    );
    let partial = current.partial;

    async move {
        let response = CURRENT_REQUEST.scope(current, next.run(request)).await;
        debug!(status = response.status().as_u16(), partial, "request handled");
        response
    }
    .instrument(span)
    .await
}
