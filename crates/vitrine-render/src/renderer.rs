//! View renderer and the handler wrapper that turns view models into pages.

use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::engine::TemplateEngine;
use crate::error::RenderError;
use crate::model::to_context;
use crate::request::current_request;

/// Future returned by handlers built with [`wrap`].
pub type ViewFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// A rendered HTML document.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub status: StatusCode,
    pub body: String,
}

impl Rendered {
    pub const CONTENT_TYPE: &'static str = "text/html; charset=utf-8";

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl IntoResponse for Rendered {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, HeaderValue::from_static(Self::CONTENT_TYPE))],
            self.body,
        )
            .into_response()
    }
}

/// Renders templates against the ambient request.
#[derive(Clone)]
pub struct Renderer {
    engine: Arc<dyn TemplateEngine>,
}

impl Renderer {
    pub fn new(engine: impl TemplateEngine + 'static) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    pub fn from_arc(engine: Arc<dyn TemplateEngine>) -> Self {
        Self { engine }
    }

    /// Render `name` with `model` for the request installed in this context.
    ///
    /// Fails with [`RenderError::ContextMissing`] before touching the model or
    /// the engine when called outside request handling.
    pub fn render<M>(&self, name: &str, model: Option<&M>) -> Result<Rendered, RenderError>
    where
        M: Serialize + ?Sized,
    {
        let request = current_request()?;
        let context = to_context(model)?;
        let body = self.engine.render_template(&request, name, context)?;

        Ok(Rendered {
            status: StatusCode::OK,
            body,
        })
    }

    /// Render `name` with an empty context.
    pub fn render_empty(&self, name: &str) -> Result<Rendered, RenderError> {
        self.render::<()>(name, None)
    }
}

/// Wrap a model-returning handler so it produces a rendered page.
///
/// `handler` takes a single extractor `A` (use a tuple for several, or `()`
/// for none) and resolves to `Result<M, E>`. The wrapped handler accepts the
/// same extractor, renders `Ok` models with `template` and turns `Err` into a
/// response with `E::into_response`. Rendering failures become 500s.
///
/// ```ignore
/// let home = wrap(renderer, "home.html", |(): ()| async {
///     Ok::<_, Infallible>(Home { items: vec![1, 2, 3] })
/// });
/// Router::new().route("/", get(home));
/// ```
pub fn wrap<A, F, Fut, M, E>(
    renderer: Renderer,
    template: impl Into<Cow<'static, str>>,
    handler: F,
) -> impl Fn(A) -> ViewFuture + Clone + Send + Sync + 'static
where
    A: Send + 'static,
    F: Fn(A) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<M, E>> + Send + 'static,
    M: Serialize + Send,
    E: IntoResponse + Send,
{
    let template: Cow<'static, str> = template.into();

    move |args: A| -> ViewFuture {
        let renderer = renderer.clone();
        let template = template.clone();
        let handler = handler.clone();

        Box::pin(async move {
            match handler(args).await {
                Ok(model) => match renderer.render(&template, Some(&model)) {
                    Ok(page) => page.into_response(),
                    Err(e) => e.into_response(),
                },
                Err(e) => e.into_response(),
            }
        })
    }
}
