//! Template engines.
//!
//! The renderer talks to templates through [`TemplateEngine`]; the stock
//! implementation is [`JinjaTemplates`], backed by minijinja and a template
//! directory.

use std::path::{Path, PathBuf};

use minijinja::{Environment, ErrorKind};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::RenderError;
use crate::request::CurrentRequest;

/// URL prefix static assets are served under.
pub const STATIC_PREFIX: &str = "/static";

/// Key the request is exposed under unless the model defines it.
const REQUEST_KEY: &str = "request";

/// Resolves a named template and substitutes `context` into it.
pub trait TemplateEngine: Send + Sync {
    fn render_template(
        &self,
        request: &CurrentRequest,
        name: &str,
        context: Map<String, Value>,
    ) -> Result<String, RenderError>;
}

/// minijinja-backed engine.
///
/// HTML auto-escaping follows the template's file extension.
pub struct JinjaTemplates {
    env: Environment<'static>,
    root: Option<PathBuf>,
}

impl JinjaTemplates {
    /// Load templates lazily from `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            warn!("Template directory does not exist: {}", dir.display());
        }

        let mut env = base_environment();
        env.set_loader(minijinja::path_loader(dir.clone()));

        Self {
            env,
            root: Some(dir),
        }
    }

    /// Build an engine from in-memory `(name, source)` pairs.
    pub fn from_sources<I, N, S>(sources: I) -> Result<Self, RenderError>
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: Into<String>,
    {
        let mut env = base_environment();
        for (name, source) in sources {
            env.add_template_owned(name.into(), source.into())?;
        }

        Ok(Self { env, root: None })
    }

    /// Template directory, if this engine loads from disk.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }
}

impl TemplateEngine for JinjaTemplates {
    fn render_template(
        &self,
        request: &CurrentRequest,
        name: &str,
        mut context: Map<String, Value>,
    ) -> Result<String, RenderError> {
        let template = self.env.get_template(name).map_err(|e| match e.kind() {
            ErrorKind::TemplateNotFound => RenderError::TemplateNotFound(name.to_string()),
            _ => RenderError::Template(e),
        })?;

        if !context.contains_key(REQUEST_KEY) {
            context.insert(REQUEST_KEY.to_string(), serde_json::to_value(request)?);
        }

        debug!(request = %request.id, template = name, "rendering template");
        Ok(template.render(&context)?)
    }
}

fn base_environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.add_function("static_url", |path: String| {
        format!("{STATIC_PREFIX}/{}", path.trim_start_matches('/'))
    });
    env
}
