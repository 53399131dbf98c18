//! Validation subsystem.
//!
//! # Responsibilities
//! - Declarative per-field rules (required, range, excluded characters)
//! - Cross-field checks supplied by the model
//! - Client-side rule descriptions mirroring the server rules
//! - Per-request model state collecting binding and validation errors
//!
//! # Design Decisions
//! - Rules are data attached to fields, interpreted by one evaluator
//! - Validation failures are values, never panics or request errors
//! - The server re-validates every submission regardless of client checks

pub mod evaluator;
pub mod rules;

use serde::Serialize;

pub use evaluator::{validate, Validatable};
pub use rules::{ClientRule, FieldRules, FieldValue, Rule};

/// A failed check: message plus the member names it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub message: String,
    pub members: Vec<String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, members: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            message: message.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn applies_to(&self, member: &str) -> bool {
        self.members.iter().any(|m| m.eq_ignore_ascii_case(member))
    }
}

/// Errors accumulated for the current request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModelState {
    errors: Vec<ValidationError>,
}

impl ModelState {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = ValidationError>) {
        self.errors.extend(errors);
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn errors_for<'a>(&'a self, member: &'a str) -> impl Iterator<Item = &'a ValidationError> + 'a {
        self.errors.iter().filter(move |e| e.applies_to(member))
    }
}
