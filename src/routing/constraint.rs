//! Route parameter constraints.
//!
//! # Responsibilities
//! - Decide whether a captured route value is acceptable for a parameter
//! - Provide the built-in inline constraints (`int`, `alpha`, `regex`, `length`)
//! - Provide the custom set-membership constraint (`match`)
//! - Map short inline tokens to constraint builders (`ConstraintMap`)
//!
//! # Design Decisions
//! - Constraints see only the parameter name and the captured values, never
//!   the rest of the request
//! - Set membership is always case-insensitive (both sides lower-cased)
//! - A constraint asked about a parameter with no captured value is a
//!   programming error and reports `RouteError::MissingValue`

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::routing::{RouteError, RouteValues};

/// A predicate over a named route parameter.
pub trait RouteConstraint: Send + Sync + fmt::Debug {
    /// Returns whether the value captured for `parameter` is acceptable.
    fn matches(&self, parameter: &str, values: &RouteValues) -> Result<bool, RouteError>;
}

/// Fetch the captured value for a parameter, failing loudly if absent.
fn required_value<'a>(parameter: &str, values: &'a RouteValues) -> Result<&'a str, RouteError> {
    values
        .get(parameter)
        .ok_or_else(|| RouteError::MissingValue(parameter.to_string()))
}

/// Returns true iff the lower-cased candidate is in the lower-cased allowed set.
pub fn is_member(candidate: &str, allowed: &HashSet<String>) -> bool {
    allowed.contains(&candidate.to_lowercase())
}

/// Case-insensitive exact-set membership.
#[derive(Debug, Clone)]
pub struct SetConstraint {
    allowed: HashSet<String>,
}

impl SetConstraint {
    /// Parse a pipe-separated list such as `"alice|Bob"`.
    pub fn parse(delimited: &str) -> Self {
        Self::from_values(delimited.split('|'))
    }

    /// Build from an explicit list of values. Values are only lower-cased:
    /// whitespace is kept and an empty entry allows the empty string.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = values.into_iter().map(|v| v.as_ref().to_lowercase()).collect();
        Self { allowed }
    }

    pub fn allows(&self, candidate: &str) -> bool {
        is_member(candidate, &self.allowed)
    }
}

impl RouteConstraint for SetConstraint {
    fn matches(&self, parameter: &str, values: &RouteValues) -> Result<bool, RouteError> {
        Ok(self.allows(required_value(parameter, values)?))
    }
}

/// Regular-expression constraint. The whole value must match.
#[derive(Debug, Clone)]
pub struct RegexConstraint {
    regex: Regex,
}

impl RegexConstraint {
    pub fn new(pattern: &str) -> Result<Self, RouteError> {
        // The whole value must match, not a substring.
        let anchored = format!("^(?:{})$", pattern);
        let regex = Regex::new(&anchored).map_err(|e| RouteError::InvalidRegex {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { regex })
    }
}

impl RouteConstraint for RegexConstraint {
    fn matches(&self, parameter: &str, values: &RouteValues) -> Result<bool, RouteError> {
        Ok(self.regex.is_match(required_value(parameter, values)?))
    }
}

/// Value must parse as a signed 64-bit integer.
#[derive(Debug, Clone, Copy)]
pub struct IntConstraint;

impl RouteConstraint for IntConstraint {
    fn matches(&self, parameter: &str, values: &RouteValues) -> Result<bool, RouteError> {
        Ok(required_value(parameter, values)?.parse::<i64>().is_ok())
    }
}

/// Value must be non-empty and alphabetic.
#[derive(Debug, Clone, Copy)]
pub struct AlphaConstraint;

impl RouteConstraint for AlphaConstraint {
    fn matches(&self, parameter: &str, values: &RouteValues) -> Result<bool, RouteError> {
        let value = required_value(parameter, values)?;
        Ok(!value.is_empty() && value.chars().all(char::is_alphabetic))
    }
}

/// Value length (in characters) must lie within `min..=max`.
#[derive(Debug, Clone, Copy)]
pub struct LengthConstraint {
    min: usize,
    max: usize,
}

impl RouteConstraint for LengthConstraint {
    fn matches(&self, parameter: &str, values: &RouteValues) -> Result<bool, RouteError> {
        let len = required_value(parameter, values)?.chars().count();
        Ok(len >= self.min && len <= self.max)
    }
}

/// Wraps the constraints of an optional parameter: an absent value passes.
#[derive(Debug)]
pub struct OptionalConstraint {
    inner: Arc<dyn RouteConstraint>,
}

impl OptionalConstraint {
    pub fn new(inner: Arc<dyn RouteConstraint>) -> Self {
        Self { inner }
    }
}

impl RouteConstraint for OptionalConstraint {
    fn matches(&self, parameter: &str, values: &RouteValues) -> Result<bool, RouteError> {
        if values.get(parameter).is_none() {
            return Ok(true);
        }
        self.inner.matches(parameter, values)
    }
}

/// Builds a constraint from the argument text of an inline token,
/// e.g. `rdiegoni` in `{user:match(rdiegoni)}`.
pub type ConstraintBuilder =
    Arc<dyn Fn(Option<&str>) -> Result<Arc<dyn RouteConstraint>, RouteError> + Send + Sync>;

/// Registry mapping inline constraint tokens to builders.
#[derive(Clone)]
pub struct ConstraintMap {
    builders: HashMap<String, ConstraintBuilder>,
}

impl fmt::Debug for ConstraintMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tokens: Vec<_> = self.builders.keys().collect();
        tokens.sort();
        f.debug_struct("ConstraintMap").field("tokens", &tokens).finish()
    }
}

impl ConstraintMap {
    /// An empty map with no tokens at all.
    pub fn empty() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// Register a token. Tokens are case-insensitive.
    pub fn insert<F>(&mut self, token: &str, builder: F)
    where
        F: Fn(Option<&str>) -> Result<Arc<dyn RouteConstraint>, RouteError> + Send + Sync + 'static,
    {
        self.builders.insert(token.to_lowercase(), Arc::new(builder));
    }

    pub fn contains(&self, token: &str) -> bool {
        self.builders.contains_key(&token.to_lowercase())
    }

    /// Resolve `token(argument)` into a constraint.
    pub fn build(
        &self,
        token: &str,
        argument: Option<&str>,
    ) -> Result<Arc<dyn RouteConstraint>, RouteError> {
        let builder = self
            .builders
            .get(&token.to_lowercase())
            .ok_or_else(|| RouteError::UnknownConstraint(token.to_string()))?;
        builder(argument)
    }
}

impl Default for ConstraintMap {
    /// Built-in tokens plus the custom `match` set constraint.
    fn default() -> Self {
        let mut map = Self::empty();
        map.insert("int", |_| Ok(Arc::new(IntConstraint) as Arc<dyn RouteConstraint>));
        map.insert("alpha", |_| Ok(Arc::new(AlphaConstraint) as Arc<dyn RouteConstraint>));
        map.insert("regex", |arg| {
            let pattern = require_argument("regex", arg)?;
            Ok(Arc::new(RegexConstraint::new(pattern)?) as Arc<dyn RouteConstraint>)
        });
        map.insert("length", |arg| {
            let raw = require_argument("length", arg)?;
            let (min, max) = parse_length(raw)?;
            Ok(Arc::new(LengthConstraint { min, max }) as Arc<dyn RouteConstraint>)
        });
        map.insert("match", |arg| {
            let users = require_argument("match", arg)?;
            Ok(Arc::new(SetConstraint::parse(users)) as Arc<dyn RouteConstraint>)
        });
        map
    }
}

fn require_argument<'a>(token: &str, argument: Option<&'a str>) -> Result<&'a str, RouteError> {
    argument
        .filter(|a| !a.is_empty())
        .ok_or_else(|| RouteError::MissingArgument(token.to_string()))
}

/// `length(n)` means exactly n, `length(min,max)` an inclusive range.
fn parse_length(raw: &str) -> Result<(usize, usize), RouteError> {
    let invalid = || RouteError::InvalidArgument {
        token: "length".to_string(),
        argument: raw.to_string(),
    };
    let mut parts = raw.split(',').map(|p| p.trim().parse::<usize>());
    let first = parts.next().ok_or_else(invalid)?.map_err(|_| invalid())?;
    let second = match parts.next() {
        Some(p) => p.map_err(|_| invalid())?,
        None => first,
    };
    if parts.next().is_some() || first > second {
        return Err(invalid());
    }
    Ok((first, second))
}
