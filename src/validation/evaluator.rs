//! Generic rule evaluation over a model.
//!
//! Field rules run first, independently per field, in declaration order.
//! The model's cross-field checks follow. The sequence is lazy: nothing is
//! evaluated until it is pulled.

use crate::validation::rules::{FieldRules, FieldValue};
use crate::validation::ValidationError;

/// A model with declarative field rules and optional cross-field checks.
pub trait Validatable {
    fn field_rules() -> &'static [FieldRules];

    fn field_value(&self, name: &str) -> FieldValue<'_>;

    /// Checks spanning several fields.
    fn validate_object(&self) -> Vec<ValidationError> {
        Vec::new()
    }
}

/// Lazily evaluate every rule of `model`.
pub fn validate<M: Validatable>(model: &M) -> impl Iterator<Item = ValidationError> + '_ {
    let per_field = M::field_rules().iter().flat_map(move |field| {
        field.rules.iter().filter_map(move |rule| {
            rule.check(field.display_name, model.field_value(field.name))
                .map(|message| ValidationError::new(message, [field.name]))
        })
    });
    let cross_field = std::iter::once(()).flat_map(move |_| model.validate_object());
    per_field.chain(cross_field)
}
