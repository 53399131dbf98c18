//! Binding subsystem: turns raw request input into handler parameters.
//!
//! # Data Flow
//! ```text
//! Request (query, body, cookies) + RouteValues
//!     → form.rs (parse url-encoded fields and cookies)
//!     → value_provider.rs (ordered providers: form, route, query, cookie)
//!     → model_binder.rs (registered binder or the model's default binding)
//!     → Binding { model, conversion errors }
//! ```

pub mod form;
pub mod model_binder;
pub mod value_provider;

use axum::http::{header, HeaderMap, Method, Uri};

pub use form::{CookieJar, FormData, SetCookie};
pub use model_binder::{BindModel, Binding, BindingContext, CompositeFieldBinder, ModelBinder, ModelBinders};
pub use value_provider::{
    CookieValueProvider, CookieValueProviderFactory, FormValueProviderFactory, QueryValueProviderFactory,
    RouteValueProviderFactory, ValueProvider, ValueProviderCollection, ValueProviderFactory,
    ValueProviderResult,
};

/// The parsed inputs of one request.
#[derive(Debug, Clone)]
pub struct RequestData {
    pub method: Method,
    pub path: String,
    pub query: FormData,
    pub form: FormData,
    pub cookies: CookieJar,
    pub headers: HeaderMap,
}

impl RequestData {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            query: FormData::default(),
            form: FormData::default(),
            cookies: CookieJar::default(),
            headers: HeaderMap::new(),
        }
    }

    /// Build from raw parts; the body is read as a form only when it is url-encoded.
    pub fn from_parts(method: Method, uri: &Uri, headers: HeaderMap, body: &[u8]) -> Self {
        let query = uri
            .query()
            .map(|q| FormData::parse(q.as_bytes()))
            .unwrap_or_default();
        let is_form = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);
        let form = if is_form {
            FormData::parse(body)
        } else {
            FormData::default()
        };
        let cookies = CookieJar::from_headers(&headers);
        Self {
            method,
            path: uri.path().to_string(),
            query,
            form,
            cookies,
            headers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_from_parts_reads_form_only_when_urlencoded() {
        let uri: Uri = "/TestModelBinding?x=1".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        let data = RequestData::from_parts(Method::POST, &uri, headers, b"Day=1");
        assert_eq!(data.path, "/TestModelBinding");
        assert_eq!(data.query.get("x").as_deref(), Some("1"));
        assert_eq!(data.form.get("Day").as_deref(), Some("1"));

        let data = RequestData::from_parts(Method::POST, &uri, HeaderMap::new(), b"Day=1");
        assert!(data.form.is_empty());
    }
}
