//! Model binding.
//!
//! A model type binds through the binder registered for it in
//! `ModelBinders`, falling back to its own `BindModel` implementation.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::binding::form::FormData;
use crate::binding::value_provider::ValueProviderCollection;
use crate::validation::ValidationError;

/// Inputs available while binding one model.
#[derive(Debug, Clone, Copy)]
pub struct BindingContext<'a> {
    pub form: &'a FormData,
    pub values: &'a ValueProviderCollection,
}

impl<'a> BindingContext<'a> {
    pub fn new(form: &'a FormData, values: &'a ValueProviderCollection) -> Self {
        Self { form, values }
    }

    /// Non-empty string for `key`, from the first provider reporting it.
    pub fn string(&self, key: &str) -> Option<String> {
        self.values.string(key)
    }

    /// Parse a value, recording a conversion error instead of failing.
    ///
    /// Empty input binds as `None` without an error.
    pub fn parsed<T: std::str::FromStr>(
        &self,
        key: &str,
        errors: &mut Vec<ValidationError>,
    ) -> Option<T> {
        let value = self.values.value(key)?;
        if value.raw.trim().is_empty() {
            return None;
        }
        match value.convert::<T>() {
            Some(parsed) => Some(parsed),
            None => {
                errors.push(ValidationError::new(
                    format!("The value '{}' is not valid for {}.", value.attempted, key),
                    [key],
                ));
                None
            }
        }
    }

    /// Checkbox semantics: the first of the joined values decides.
    pub fn flag(&self, key: &str) -> bool {
        self.values
            .value(key)
            .and_then(|v| v.raw.split(',').next().map(|s| s.trim().eq_ignore_ascii_case("true")))
            .unwrap_or(false)
    }
}

/// The outcome of binding: a model plus any conversion errors.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding<M> {
    pub model: M,
    pub errors: Vec<ValidationError>,
}

impl<M> Binding<M> {
    pub fn ok(model: M) -> Self {
        Self {
            model,
            errors: Vec::new(),
        }
    }
}

/// A custom binder for one model type.
pub trait ModelBinder: Send + Sync {
    type Model;

    fn bind_model(&self, ctx: &BindingContext<'_>) -> Binding<Self::Model>;
}

/// Default binding a model type provides for itself.
pub trait BindModel: Sized + 'static {
    fn bind(ctx: &BindingContext<'_>) -> Binding<Self>;
}

/// Registered binders keyed by model type.
#[derive(Default)]
pub struct ModelBinders {
    binders: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl fmt::Debug for ModelBinders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBinders")
            .field("registered", &self.binders.len())
            .finish()
    }
}

impl ModelBinders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<B>(&mut self, binder: B)
    where
        B: ModelBinder + 'static,
        B::Model: 'static,
    {
        let binder: Arc<dyn ModelBinder<Model = B::Model>> = Arc::new(binder);
        self.binders.insert(TypeId::of::<B::Model>(), Box::new(binder));
    }

    pub fn has_binder<M: 'static>(&self) -> bool {
        self.binders.contains_key(&TypeId::of::<M>())
    }

    /// Bind with the registered binder, if any.
    pub fn bind_custom<M: 'static>(&self, ctx: &BindingContext<'_>) -> Option<Binding<M>> {
        self.binders
            .get(&TypeId::of::<M>())
            .and_then(|b| b.downcast_ref::<Arc<dyn ModelBinder<Model = M>>>())
            .map(|binder| binder.bind_model(ctx))
    }

    pub fn bind<M: BindModel>(&self, ctx: &BindingContext<'_>) -> Binding<M> {
        self.bind_custom(ctx).unwrap_or_else(|| M::bind(ctx))
    }
}

/// Joins several raw form fields into one composite value.
///
/// Missing fields contribute an empty segment; nothing is validated here.
#[derive(Debug, Clone)]
pub struct CompositeFieldBinder {
    fields: Vec<String>,
    separator: String,
}

impl CompositeFieldBinder {
    pub fn new(fields: &[&str], separator: &str) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            separator: separator.to_string(),
        }
    }

    pub fn join(&self, form: &FormData) -> String {
        self.fields
            .iter()
            .map(|f| form.get(f).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(&self.separator)
    }
}
