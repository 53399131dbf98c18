//! Raw request field sources: url-encoded forms, query strings and cookies.

use axum::http::{header, HeaderMap};

/// Url-encoded name/value pairs in arrival order.
///
/// Lookups are case-insensitive. Repeated keys join with `,`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: Vec<(String, String)>,
}

impl FormData {
    pub fn parse(input: &[u8]) -> Self {
        let fields = url::form_urlencoded::parse(input)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { fields }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k.eq_ignore_ascii_case(key))
    }

    /// All values for `key`, joined by `,`.
    pub fn get(&self, key: &str) -> Option<String> {
        let values: Vec<&str> = self.get_all(key).collect();
        if values.is_empty() {
            None
        } else {
            Some(values.join(","))
        }
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Request cookies parsed from the `Cookie` header(s).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: Vec<(String, String)>,
}

impl CookieJar {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut cookies = Vec::new();
        for value in headers.get_all(header::COOKIE) {
            let Ok(raw) = value.to_str() else {
                continue;
            };
            for pair in raw.split(';') {
                let Some((name, value)) = pair.split_once('=') else {
                    continue;
                };
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                let value = value.trim().trim_matches('"');
                cookies.push((name.to_string(), value.to_string()));
            }
        }
        Self { cookies }
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        self.cookies.push((name.to_string(), value.to_string()));
    }

    /// Cookie names are case-sensitive; the first occurrence wins.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// A cookie set by an action on the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub path: String,
}

impl SetCookie {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            path: "/".to_string(),
        }
    }

    pub fn to_header_value(&self) -> String {
        format!("{}={}; Path={}", self.name, self.value, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_form_parse_and_join() {
        let form = FormData::parse(b"Day=5&Month=6&HasSalary=true&hassalary=false&Name=a+b%21");
        assert_eq!(form.get("day").as_deref(), Some("5"));
        assert_eq!(form.get("HasSalary").as_deref(), Some("true,false"));
        assert_eq!(form.get("Name").as_deref(), Some("a b!"));
        assert!(form.get("Year").is_none());
    }

    #[test]
    fn test_cookie_jar() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("id=3; theme=\"dark\""));
        headers.append(header::COOKIE, HeaderValue::from_static("other=x; broken"));
        let jar = CookieJar::from_headers(&headers);
        assert_eq!(jar.get("id"), Some("3"));
        assert_eq!(jar.get("theme"), Some("dark"));
        assert_eq!(jar.get("other"), Some("x"));
        assert!(!jar.contains("ID"));
        assert!(!jar.contains("broken"));
    }
}
