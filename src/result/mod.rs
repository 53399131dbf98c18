//! Action results.
//!
//! # Data Flow
//! ```text
//! Controller action
//!     → ActionResult (view, content, redirect, status)
//!     → filters may rewrite the view model (execution time)
//!     → into_response (view.rs renders views, xml.rs builds bodies)
//!     → axum Response
//! ```

pub mod view;
pub mod xml;

use std::collections::BTreeMap;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::binding::SetCookie;

pub use view::{JsonViewRenderer, ViewModel, ViewRenderer, ViewResult};
pub use xml::{XmlResult, XmlSerialize, XmlWriter};

/// A raw, fully buffered body with an explicit content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentResult {
    pub content_type: String,
    pub body: Bytes,
}

/// Everything an action can produce.
#[derive(Debug)]
pub enum ActionResult {
    View(ViewResult),
    Content(ContentResult),
    Redirect { location: String },
    Status(StatusCode),
}

impl ActionResult {
    pub fn view(view_name: &str, model: impl ViewModel + 'static) -> Self {
        ActionResult::View(ViewResult::new(view_name, Some(Box::new(model))))
    }

    pub fn empty_view(view_name: &str) -> Self {
        ActionResult::View(ViewResult::new(view_name, None))
    }

    pub fn not_found() -> Self {
        ActionResult::Status(StatusCode::NOT_FOUND)
    }

    /// The model carried by a view result, if any.
    pub fn view_model_mut(&mut self) -> Option<&mut (dyn ViewModel + 'static)> {
        match self {
            ActionResult::View(view) => view.model.as_deref_mut(),
            _ => None,
        }
    }

    /// Turn the result into an HTTP response.
    pub fn into_response(self, renderer: &dyn ViewRenderer, cookies: &[SetCookie]) -> Response {
        let mut response = match self {
            ActionResult::View(view) => match renderer.render(&view) {
                Ok(content) => content_response(StatusCode::OK, content),
                Err(e) => {
                    tracing::error!(view = %view.view_name, error = %e, "View rendering failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, "View rendering failed").into_response()
                }
            },
            ActionResult::Content(content) => content_response(StatusCode::OK, content),
            ActionResult::Redirect { location } => redirect_response(&location),
            ActionResult::Status(status) => status.into_response(),
        };

        for cookie in cookies {
            match HeaderValue::from_str(&cookie.to_header_value()) {
                Ok(value) => {
                    response.headers_mut().append(header::SET_COOKIE, value);
                }
                Err(_) => tracing::warn!(cookie = %cookie.name, "Dropping cookie with invalid header characters"),
            }
        }
        response
    }
}

fn content_response(status: StatusCode, content: ContentResult) -> Response {
    let mut response = Response::new(Body::from(content.body));
    *response.status_mut() = status;
    if let Ok(value) = HeaderValue::from_str(&content.content_type) {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    response
}

pub(crate) fn redirect_response(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => {
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::FOUND;
            response.headers_mut().insert(header::LOCATION, value);
            response
        }
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Invalid redirect target").into_response(),
    }
}

/// Free-form data passed next to the model (the classic "view bag").
pub type ViewData = BTreeMap<String, serde_json::Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_result_sets_content_type() {
        let result = ActionResult::Content(ContentResult {
            content_type: "application/xml".to_string(),
            body: Bytes::from_static(b"<a/>"),
        });
        let response = result.into_response(&JsonViewRenderer, &[]);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/xml");
    }

    #[test]
    fn test_cookies_are_appended() {
        let cookies = vec![SetCookie::new("id", "3"), SetCookie::new("b", "c")];
        let response = ActionResult::Status(StatusCode::NO_CONTENT).into_response(&JsonViewRenderer, &cookies);
        let set: Vec<_> = response.headers().get_all(header::SET_COOKIE).iter().collect();
        assert_eq!(set.len(), 2);
        assert_eq!(set[0], "id=3; Path=/");
    }

    #[test]
    fn test_redirect() {
        let response = ActionResult::Redirect {
            location: "https://github.com/drioemgaoin".to_string(),
        }
        .into_response(&JsonViewRenderer, &[]);
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "https://github.com/drioemgaoin");
    }
}
