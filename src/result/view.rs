//! View results and the rendering seam.
//!
//! Templating is an external collaborator; the crate only needs a
//! `ViewRenderer`. The default renderer emits the view as JSON.

use std::fmt;

use axum::body::Bytes;
use serde_json::{json, Value};

use crate::result::{ContentResult, ViewData};

/// A model handed to a view.
pub trait ViewModel: Send + fmt::Debug {
    /// Serialized form used by renderers.
    fn to_value(&self) -> serde_json::Result<Value>;

    /// The "execution time" field written by timing filters, if the model has one.
    fn execution_time_mut(&mut self) -> Option<&mut f64> {
        None
    }
}

/// A view name plus its model and view data.
#[derive(Debug)]
pub struct ViewResult {
    pub view_name: String,
    pub model: Option<Box<dyn ViewModel>>,
    pub view_data: ViewData,
}

impl ViewResult {
    pub fn new(view_name: &str, model: Option<Box<dyn ViewModel>>) -> Self {
        Self {
            view_name: view_name.to_string(),
            model,
            view_data: ViewData::new(),
        }
    }

    pub fn with_data(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.view_data.insert(key.to_string(), value.into());
        self
    }
}

/// Renders a view into a buffered body.
pub trait ViewRenderer: Send + Sync {
    fn render(&self, view: &ViewResult) -> Result<ContentResult, serde_json::Error>;
}

/// Renders `{ "view", "model", "viewData" }` as `application/json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonViewRenderer;

impl ViewRenderer for JsonViewRenderer {
    fn render(&self, view: &ViewResult) -> Result<ContentResult, serde_json::Error> {
        let model = match &view.model {
            Some(model) => model.to_value()?,
            None => Value::Null,
        };
        let body = serde_json::to_vec(&json!({
            "view": view.view_name,
            "model": model,
            "viewData": view.view_data,
        }))?;
        Ok(ContentResult {
            content_type: "application/json".to_string(),
            body: Bytes::from(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Serialize)]
    struct Sample {
        name: &'static str,
    }

    impl ViewModel for Sample {
        fn to_value(&self) -> serde_json::Result<Value> {
            serde_json::to_value(self)
        }
    }

    #[test]
    fn test_json_renderer() {
        let view = ViewResult::new("Index", Some(Box::new(Sample { name: "x" }))).with_data("Message", "hi");
        let content = JsonViewRenderer.render(&view).unwrap();
        let value: Value = serde_json::from_slice(&content.body).unwrap();
        assert_eq!(value["view"], "Index");
        assert_eq!(value["model"]["name"], "x");
        assert_eq!(value["viewData"]["Message"], "hi");
        assert_eq!(content.content_type, "application/json");
    }
}
