//! Route pattern parsing and structural matching.
//!
//! Syntax, one segment per `/`:
//! - `literal`: compared case-insensitively
//! - `{name}`: required parameter
//! - `{name?}`: optional parameter (trailing segments only)
//! - `{*name}`: catch-all, must be the last segment
//! - `{name:int:length(1,3)}`: inline constraints resolved through a `ConstraintMap`
//! - `{resource}.axd`: complex segment mixing literals and parameters

use std::sync::Arc;

use crate::routing::constraint::{ConstraintMap, OptionalConstraint, RouteConstraint};
use crate::routing::{RouteError, RouteValues};

#[derive(Debug, Clone)]
enum Part {
    Literal(String),
    Parameter(String),
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Parameter { name: String, optional: bool },
    CatchAll(String),
    Complex(Vec<Part>),
}

/// A parameter declared in a pattern together with its inline constraints.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub name: String,
    pub optional: bool,
    pub constraints: Vec<Arc<dyn RouteConstraint>>,
}

/// A compiled URL template.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    template: String,
    segments: Vec<Segment>,
    parameters: Vec<ParameterSpec>,
}

impl RoutePattern {
    /// Parse a template, resolving inline constraint tokens through `map`.
    pub fn parse(template: &str, map: &ConstraintMap) -> Result<Self, RouteError> {
        let invalid = |reason: &str| RouteError::InvalidPattern {
            pattern: template.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = template.trim_matches('/');
        let mut segments = Vec::new();
        let mut parameters: Vec<ParameterSpec> = Vec::new();

        if !trimmed.is_empty() {
            let raw_segments = split_segments(trimmed).map_err(|r| invalid(&r))?;
            let count = raw_segments.len();
            for (index, raw) in raw_segments.iter().enumerate() {
                if raw.is_empty() {
                    return Err(invalid("empty segment"));
                }
                let mut parts = parse_parts(raw).map_err(|r| invalid(&r))?;
                let segment = if parts.len() == 1 {
                    match parts.remove(0) {
                        RawPart::Literal(text) => Segment::Literal(text),
                        RawPart::Parameter(body) => {
                            let spec = parse_parameter(&body, map)?;
                            let segment = if let Some(name) = spec.name.strip_prefix('*') {
                                if index + 1 != count {
                                    return Err(invalid("catch-all parameter must be last"));
                                }
                                Segment::CatchAll(name.to_string())
                            } else {
                                Segment::Parameter {
                                    name: spec.name.clone(),
                                    optional: spec.optional,
                                }
                            };
                            parameters.push(spec);
                            segment
                        }
                    }
                } else {
                    let mut complex = Vec::new();
                    let mut previous_was_parameter = false;
                    for part in parts {
                        match part {
                            RawPart::Literal(text) => {
                                previous_was_parameter = false;
                                complex.push(Part::Literal(text));
                            }
                            RawPart::Parameter(body) => {
                                if previous_was_parameter {
                                    return Err(invalid("adjacent parameters need a separator"));
                                }
                                let spec = parse_parameter(&body, map)?;
                                if spec.optional || spec.name.starts_with('*') {
                                    return Err(invalid(
                                        "optional and catch-all parameters must fill a segment",
                                    ));
                                }
                                previous_was_parameter = true;
                                complex.push(Part::Parameter(spec.name.clone()));
                                parameters.push(spec);
                            }
                        }
                    }
                    Segment::Complex(complex)
                };
                segments.push(segment);
            }
        }

        // Names are case-insensitive and must be unique.
        for (i, p) in parameters.iter().enumerate() {
            let name = p.name.trim_start_matches('*');
            if name.is_empty() {
                return Err(invalid("parameter without a name"));
            }
            if parameters[..i]
                .iter()
                .any(|q| q.name.trim_start_matches('*').eq_ignore_ascii_case(name))
            {
                return Err(invalid("duplicate parameter name"));
            }
        }
        for p in &mut parameters {
            if let Some(stripped) = p.name.strip_prefix('*') {
                p.name = stripped.to_string();
                p.optional = true;
            }
        }

        // Optional parameters may only be followed by other optional parameters.
        let mut seen_optional = false;
        for segment in &segments {
            match segment {
                Segment::Parameter { optional: true, .. } | Segment::CatchAll(_) => {
                    seen_optional = true
                }
                _ if seen_optional => {
                    return Err(invalid("optional parameter followed by a required segment"))
                }
                _ => {}
            }
        }

        Ok(Self {
            template: template.to_string(),
            segments,
            parameters,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Inline constraints keyed by parameter, wrapped so that absent
    /// optional values pass.
    pub fn inline_constraints(&self) -> Vec<(String, Arc<dyn RouteConstraint>)> {
        let mut out = Vec::new();
        for p in &self.parameters {
            for c in &p.constraints {
                let constraint: Arc<dyn RouteConstraint> = if p.optional {
                    Arc::new(OptionalConstraint::new(c.clone()))
                } else {
                    c.clone()
                };
                out.push((p.name.clone(), constraint));
            }
        }
        out
    }

    /// Structurally match a request path, capturing parameter values.
    ///
    /// Returns `None` when the shape does not fit. Constraints are not
    /// evaluated here.
    pub fn capture(&self, path: &str) -> Option<RouteValues> {
        let trimmed = path.trim_matches('/');
        let path_segments: Vec<&str> = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').collect()
        };

        let mut values = RouteValues::default();
        let mut cursor = 0;

        for segment in &self.segments {
            match segment {
                Segment::CatchAll(name) => {
                    let rest = path_segments[cursor.min(path_segments.len())..].join("/");
                    if !rest.is_empty() {
                        values.insert(name, rest);
                    }
                    cursor = path_segments.len();
                }
                Segment::Parameter { name, optional } => match path_segments.get(cursor) {
                    Some(value) if !value.is_empty() => {
                        values.insert(name, *value);
                        cursor += 1;
                    }
                    None if *optional => {}
                    _ => return None,
                },
                Segment::Literal(text) => match path_segments.get(cursor) {
                    Some(value) if eq_ignore_case(value, text) => cursor += 1,
                    _ => return None,
                },
                Segment::Complex(parts) => {
                    let value = path_segments.get(cursor)?;
                    let mut captured = Vec::new();
                    if !match_complex(parts, value, &mut captured) {
                        return None;
                    }
                    for (name, v) in captured {
                        values.insert(name, v);
                    }
                    cursor += 1;
                }
            }
        }

        if cursor == path_segments.len() {
            Some(values)
        } else {
            None
        }
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

/// Backtracking match of a complex segment; parameters capture non-empty text.
fn match_complex<'a>(parts: &'a [Part], input: &str, out: &mut Vec<(&'a str, String)>) -> bool {
    match parts.split_first() {
        None => input.is_empty(),
        Some((Part::Literal(text), rest)) => {
            let len = text.len();
            if input.len() >= len
                && input.is_char_boundary(len)
                && input[..len].eq_ignore_ascii_case(text)
            {
                match_complex(rest, &input[len..], out)
            } else {
                false
            }
        }
        Some((Part::Parameter(name), rest)) => {
            // Try the longest capture first, like the classic router.
            let boundaries: Vec<usize> = input
                .char_indices()
                .map(|(i, _)| i)
                .skip(1)
                .chain(std::iter::once(input.len()))
                .collect();
            for &end in boundaries.iter().rev() {
                let mark = out.len();
                out.push((name.as_str(), input[..end].to_string()));
                if match_complex(rest, &input[end..], out) {
                    return true;
                }
                out.truncate(mark);
            }
            false
        }
    }
}

/// Split on `/`, ignoring separators inside `{...}`.
fn split_segments(template: &str) -> Result<Vec<String>, String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut brace_depth = 0usize;
    let mut paren_depth = 0usize;
    for ch in template.chars() {
        match ch {
            '{' if paren_depth == 0 => brace_depth += 1,
            '}' if paren_depth == 0 => {
                brace_depth = brace_depth.checked_sub(1).ok_or("unbalanced '}'")?;
            }
            '(' if brace_depth > 0 => paren_depth += 1,
            ')' if brace_depth > 0 => paren_depth = paren_depth.saturating_sub(1),
            '/' if brace_depth == 0 => {
                segments.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    if brace_depth != 0 {
        return Err("unbalanced '{'".to_string());
    }
    segments.push(current);
    Ok(segments)
}

enum RawPart {
    Literal(String),
    Parameter(String),
}

fn parse_parts(segment: &str) -> Result<Vec<RawPart>, String> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut chars = segment.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '{' {
            if ch == '}' {
                return Err("unexpected '}'".to_string());
            }
            literal.push(ch);
            continue;
        }
        if !literal.is_empty() {
            parts.push(RawPart::Literal(std::mem::take(&mut literal)));
        }
        let mut body = String::new();
        let mut paren_depth = 0usize;
        let mut closed = false;
        for inner in chars.by_ref() {
            match inner {
                '(' => paren_depth += 1,
                ')' => paren_depth = paren_depth.saturating_sub(1),
                '}' if paren_depth == 0 => {
                    closed = true;
                    break;
                }
                _ => {}
            }
            body.push(inner);
        }
        if !closed {
            return Err("unterminated parameter".to_string());
        }
        parts.push(RawPart::Parameter(body));
    }
    if !literal.is_empty() {
        parts.push(RawPart::Literal(literal));
    }
    Ok(parts)
}

/// Parse `name?:token(arg):token` into a parameter spec.
fn parse_parameter(body: &str, map: &ConstraintMap) -> Result<ParameterSpec, RouteError> {
    let pieces = split_constraints(body);
    let mut iter = pieces.into_iter();
    let head = iter.next().unwrap_or_default();
    let optional = head.ends_with('?');
    let name = if optional {
        head[..head.len() - 1].to_string()
    } else {
        head
    };

    let mut constraints = Vec::new();
    for piece in iter {
        let (token, argument) = match piece.find('(') {
            Some(open) if piece.ends_with(')') => {
                (&piece[..open], Some(&piece[open + 1..piece.len() - 1]))
            }
            Some(_) => {
                return Err(RouteError::InvalidArgument {
                    token: piece.clone(),
                    argument: String::new(),
                })
            }
            None => (piece.as_str(), None),
        };
        constraints.push(map.build(token, argument)?);
    }

    Ok(ParameterSpec {
        name,
        optional,
        constraints,
    })
}

/// Split on `:` outside of parentheses.
fn split_constraints(body: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for ch in body.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => {
                out.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    out.push(current);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(template: &str) -> RoutePattern {
        RoutePattern::parse(template, &ConstraintMap::default()).unwrap()
    }

    #[test]
    fn test_literal_match_is_case_insensitive() {
        let pattern = parse("TestFilter");
        assert!(pattern.capture("/testfilter").is_some());
        assert!(pattern.capture("/TESTFILTER/").is_some());
        assert!(pattern.capture("/other").is_none());
    }

    #[test]
    fn test_empty_template_matches_root() {
        let pattern = parse("");
        assert!(pattern.capture("/").is_some());
        assert!(pattern.capture("").is_some());
        assert!(pattern.capture("/x").is_none());
    }

    #[test]
    fn test_parameters_and_optional() {
        let pattern = parse("{controller}/{action}/{id?}");
        let values = pattern.capture("/Home/Index").unwrap();
        assert_eq!(values.get("controller"), Some("Home"));
        assert_eq!(values.get("action"), Some("Index"));
        assert!(values.get("id").is_none());

        let values = pattern.capture("/Home/Index/7").unwrap();
        assert_eq!(values.get("id"), Some("7"));
        assert!(pattern.capture("/Home").is_none());
        assert!(pattern.capture("/a/b/c/d").is_none());
    }

    #[test]
    fn test_inline_constraints_are_resolved() {
        let pattern = parse("TestRouteConstraint/Custom/{user:match(rdiegoni|alice)}");
        let inline = pattern.inline_constraints();
        assert_eq!(inline.len(), 1);
        let values = pattern.capture("/testrouteconstraint/custom/ALICE").unwrap();
        assert!(inline[0].1.matches("user", &values).unwrap());
    }

    #[test]
    fn test_regex_argument_may_contain_colons_and_slashes() {
        let pattern = parse("files/{name:regex(^a:b/c$)}");
        assert_eq!(pattern.parameters().len(), 1);
        assert_eq!(pattern.parameters()[0].constraints.len(), 1);
    }

    #[test]
    fn test_complex_and_catch_all_segments() {
        let pattern = parse("{resource}.axd/{*pathInfo}");
        let values = pattern.capture("/WebResource.axd/a/b").unwrap();
        assert_eq!(values.get("resource"), Some("WebResource"));
        assert_eq!(values.get("pathinfo"), Some("a/b"));

        let values = pattern.capture("/trace.axd").unwrap();
        assert!(values.get("pathInfo").is_none());
        assert!(pattern.capture("/trace.aspx").is_none());
    }

    #[test]
    fn test_invalid_patterns() {
        let map = ConstraintMap::default();
        assert!(RoutePattern::parse("{a", &map).is_err());
        assert!(RoutePattern::parse("{*rest}/tail", &map).is_err());
        assert!(RoutePattern::parse("{id?}/tail", &map).is_err());
        assert!(RoutePattern::parse("{a}{b}", &map).is_err());
        assert!(RoutePattern::parse("{a}/{A}", &map).is_err());
        assert!(matches!(
            RoutePattern::parse("{a:bogus}", &map),
            Err(RouteError::UnknownConstraint(_))
        ));
    }
}
