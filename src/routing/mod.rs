//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (first structurally matching route)
//!     → pattern.rs (segment capture into RouteValues)
//!     → constraint.rs (evaluate named constraints)
//!     → Return: RouteMatch or NoMatch
//!
//! Route Compilation (at startup):
//!     RouteDefinition[]
//!     → Parse patterns against the ConstraintMap
//!     → Attach external constraints
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Registration order is priority: first match wins
//! - Literal segments compare case-insensitively
//! - Constraint evaluation errors abort the lookup instead of skipping the route

pub mod constraint;
pub mod pattern;
pub mod router;

use std::collections::BTreeMap;

use thiserror::Error;

pub use constraint::{ConstraintMap, RegexConstraint, RouteConstraint, SetConstraint};
pub use pattern::RoutePattern;
pub use router::{Route, RouteDefinition, RouteHandlerKind, RouteMatch, RouteTable};

/// Errors raised while compiling or evaluating routes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("route parameter '{0}' has no value to check against its constraint")]
    MissingValue(String),

    #[error("unknown inline constraint '{0}'")]
    UnknownConstraint(String),

    #[error("inline constraint '{0}' requires an argument")]
    MissingArgument(String),

    #[error("invalid argument '{argument}' for inline constraint '{token}'")]
    InvalidArgument { token: String, argument: String },

    #[error("invalid regex '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("constraint attached to unknown parameter '{0}'")]
    UnknownParameter(String),
}

/// Values captured from the URL plus route defaults.
///
/// Keys are case-insensitive; they are stored lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteValues {
    values: BTreeMap<String, String>,
}

impl RouteValues {
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.values.insert(key.as_ref().to_lowercase(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&key.to_lowercase()).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(&key.to_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn controller(&self) -> Option<&str> {
        self.get("controller")
    }

    pub fn action(&self) -> Option<&str> {
        self.get("action")
    }
}
