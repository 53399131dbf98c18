//! Value providers: named lookups over the request's input sources.
//!
//! # Responsibilities
//! - Two-phase lookup per provider: `contains_key`, then `value`
//! - Query providers in registration order; first `contains_key == true` wins
//! - Supply the cookie-backed provider on top of the standard ones
//!
//! # Design Decisions
//! - Providers are built per request from the request data by factories
//!   held in the immutable configuration
//! - Values are plain strings; conversion uses locale-independent parsing

use std::fmt;
use std::str::FromStr;

use crate::binding::form::{CookieJar, FormData};
use crate::binding::RequestData;
use crate::routing::RouteValues;

/// A value found by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueProviderResult {
    /// Value as found in the source.
    pub raw: String,
    /// Value as it will be shown back when conversion fails.
    pub attempted: String,
}

impl ValueProviderResult {
    pub fn new(value: impl Into<String>) -> Self {
        let raw = value.into();
        Self {
            attempted: raw.clone(),
            raw,
        }
    }

    /// Locale-independent conversion.
    pub fn convert<T: FromStr>(&self) -> Option<T> {
        self.raw.trim().parse().ok()
    }
}

pub trait ValueProvider: Send + Sync + fmt::Debug {
    fn contains_key(&self, key: &str) -> bool;

    /// Only meaningful after `contains_key` returned true.
    fn value(&self, key: &str) -> Option<ValueProviderResult>;
}

/// Creates a provider for one request.
pub trait ValueProviderFactory: Send + Sync {
    fn create(&self, request: &RequestData, route_values: &RouteValues) -> Option<Box<dyn ValueProvider>>;
}

/// Form body fields.
#[derive(Debug)]
pub struct FormValueProvider {
    form: FormData,
}

impl FormValueProvider {
    pub fn new(form: FormData) -> Self {
        Self { form }
    }
}

impl ValueProvider for FormValueProvider {
    fn contains_key(&self, key: &str) -> bool {
        self.form.contains_key(key)
    }

    fn value(&self, key: &str) -> Option<ValueProviderResult> {
        self.form.get(key).map(ValueProviderResult::new)
    }
}

/// Query string fields.
#[derive(Debug)]
pub struct QueryValueProvider {
    query: FormData,
}

impl ValueProvider for QueryValueProvider {
    fn contains_key(&self, key: &str) -> bool {
        self.query.contains_key(key)
    }

    fn value(&self, key: &str) -> Option<ValueProviderResult> {
        self.query.get(key).map(ValueProviderResult::new)
    }
}

/// Values captured by routing.
#[derive(Debug)]
pub struct RouteValueProvider {
    values: RouteValues,
}

impl ValueProvider for RouteValueProvider {
    fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn value(&self, key: &str) -> Option<ValueProviderResult> {
        self.values.get(key).map(ValueProviderResult::new)
    }
}

/// Cookie-backed provider: a key is present iff a cookie with that name was sent.
#[derive(Debug)]
pub struct CookieValueProvider {
    cookies: CookieJar,
}

impl CookieValueProvider {
    pub fn new(cookies: CookieJar) -> Self {
        Self { cookies }
    }
}

impl ValueProvider for CookieValueProvider {
    fn contains_key(&self, key: &str) -> bool {
        self.cookies.contains(key)
    }

    fn value(&self, key: &str) -> Option<ValueProviderResult> {
        self.cookies.get(key).map(ValueProviderResult::new)
    }
}

pub struct FormValueProviderFactory;

impl ValueProviderFactory for FormValueProviderFactory {
    fn create(&self, request: &RequestData, _: &RouteValues) -> Option<Box<dyn ValueProvider>> {
        if request.form.is_empty() {
            return None;
        }
        Some(Box::new(FormValueProvider {
            form: request.form.clone(),
        }))
    }
}

pub struct RouteValueProviderFactory;

impl ValueProviderFactory for RouteValueProviderFactory {
    fn create(&self, _: &RequestData, route_values: &RouteValues) -> Option<Box<dyn ValueProvider>> {
        Some(Box::new(RouteValueProvider {
            values: route_values.clone(),
        }))
    }
}

pub struct QueryValueProviderFactory;

impl ValueProviderFactory for QueryValueProviderFactory {
    fn create(&self, request: &RequestData, _: &RouteValues) -> Option<Box<dyn ValueProvider>> {
        if request.query.is_empty() {
            return None;
        }
        Some(Box::new(QueryValueProvider {
            query: request.query.clone(),
        }))
    }
}

pub struct CookieValueProviderFactory;

impl ValueProviderFactory for CookieValueProviderFactory {
    fn create(&self, request: &RequestData, _: &RouteValues) -> Option<Box<dyn ValueProvider>> {
        Some(Box::new(CookieValueProvider::new(request.cookies.clone())))
    }
}

/// The ordered providers of one request.
#[derive(Debug, Default)]
pub struct ValueProviderCollection {
    providers: Vec<Box<dyn ValueProvider>>,
}

impl ValueProviderCollection {
    pub fn new(providers: Vec<Box<dyn ValueProvider>>) -> Self {
        Self { providers }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.providers.iter().any(|p| p.contains_key(key))
    }

    /// Ask the first provider that reports the key.
    pub fn value(&self, key: &str) -> Option<ValueProviderResult> {
        self.providers
            .iter()
            .find(|p| p.contains_key(key))
            .and_then(|p| p.value(key))
    }

    /// Non-empty string value for `key`.
    pub fn string(&self, key: &str) -> Option<String> {
        self.value(key)
            .map(|v| v.raw)
            .filter(|s| !s.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    fn request(form: &[(&str, &str)], cookies: &[(&str, &str)]) -> RequestData {
        let mut data = RequestData::new(Method::POST, "/");
        data.form = FormData::from_pairs(form.iter().copied());
        for (name, value) in cookies {
            data.cookies.insert(name, value);
        }
        data
    }

    #[test]
    fn test_cookie_provider_two_phase() {
        let empty = CookieValueProvider::new(CookieJar::default());
        assert!(!empty.contains_key("id"));

        let data = request(&[], &[("id", "3")]);
        let provider = CookieValueProviderFactory
            .create(&data, &RouteValues::default())
            .unwrap();
        assert!(provider.contains_key("id"));
        assert_eq!(provider.value("id").unwrap().raw, "3");
        assert_eq!(provider.value("id").unwrap().convert::<i32>(), Some(3));
    }

    #[test]
    fn test_first_provider_reporting_key_wins() {
        let data = request(&[("id", "form")], &[("id", "cookie"), ("only", "c")]);
        let route = RouteValues::default();
        let providers: Vec<Box<dyn ValueProvider>> = [
            &FormValueProviderFactory as &dyn ValueProviderFactory,
            &CookieValueProviderFactory,
        ]
        .iter()
        .filter_map(|f| f.create(&data, &route))
        .collect();
        let collection = ValueProviderCollection::new(providers);

        assert_eq!(collection.string("id").as_deref(), Some("form"));
        assert_eq!(collection.string("only").as_deref(), Some("c"));
        assert!(collection.value("missing").is_none());
    }
}
