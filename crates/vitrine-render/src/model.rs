//! Template context construction from view models.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::RenderError;

/// Key under which the whole view model is nested.
pub const MODEL_KEY: &str = "model";

/// Build the template context for `model`.
///
/// Object fields are spread at the top level and the whole object is also
/// nested under [`MODEL_KEY`], so templates can write either `items` or
/// `model.items`. When a field is itself called `model` the nested copy wins.
/// Non-object models (lists, scalars) are only reachable as `model`; `None`
/// and models serializing to `null` give an empty context.
pub fn to_context<M>(model: Option<&M>) -> Result<Map<String, Value>, RenderError>
where
    M: Serialize + ?Sized,
{
    let Some(model) = model else {
        return Ok(Map::new());
    };

    match serde_json::to_value(model)? {
        Value::Null => Ok(Map::new()),
        Value::Object(fields) => {
            let mut context = fields.clone();
            context.insert(MODEL_KEY.to_string(), Value::Object(fields));
            Ok(context)
        }
        other => {
            let mut context = Map::new();
            context.insert(MODEL_KEY.to_string(), other);
            Ok(context)
        }
    }
}
