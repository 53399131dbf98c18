//! View models of the demo application.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::Serialize;
use serde_json::Value;

use crate::binding::{BindModel, Binding, BindingContext, CompositeFieldBinder, ModelBinder};
use crate::result::{ViewModel, XmlSerialize, XmlWriter};
use crate::validation::{ClientRule, FieldRules, FieldValue, Rule, Validatable, ValidationError};

/// A date assembled from three form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DateModel {
    pub date: Option<String>,
}

impl ViewModel for DateModel {
    fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl BindModel for DateModel {
    fn bind(ctx: &BindingContext<'_>) -> Binding<Self> {
        Binding::ok(DateModel {
            date: ctx.string("Date"),
        })
    }
}

/// Builds `DateModel::date` as `Day/Month/Year` from the raw form.
#[derive(Debug, Clone)]
pub struct DateModelBinder {
    fields: CompositeFieldBinder,
}

impl Default for DateModelBinder {
    fn default() -> Self {
        Self {
            fields: CompositeFieldBinder::new(&["Day", "Month", "Year"], "/"),
        }
    }
}

impl ModelBinder for DateModelBinder {
    type Model = DateModel;

    fn bind_model(&self, ctx: &BindingContext<'_>) -> Binding<DateModel> {
        Binding::ok(DateModel {
            date: Some(self.fields.join(ctx.form)),
        })
    }
}

static VALIDATION_RULES: LazyLock<Vec<FieldRules>> = LazyLock::new(|| {
    vec![
        FieldRules::new(
            "Age",
            vec![
                Rule::required().with_message("The field Age is required."),
                Rule::range(0, i64::from(i32::MAX)).with_message("The field Age must be a valid integer Number"),
            ],
        ),
        FieldRules::new(
            "Name",
            vec![
                Rule::required().with_message("The field Name is required."),
                Rule::exclude_chars("0123456789"),
            ],
        ),
    ]
});

/// Form exercising declarative and cross-field validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ValidationModel {
    pub age: Option<i32>,
    pub name: Option<String>,
    pub income: Option<i32>,
    pub has_salary: bool,
    pub message: Option<String>,
}

impl ValidationModel {
    /// Client-side descriptions of every declarative rule, keyed by field.
    pub fn client_rules() -> BTreeMap<&'static str, Vec<ClientRule>> {
        Self::field_rules()
            .iter()
            .map(|field| (field.name, field.client_rules()))
            .collect()
    }
}

impl ViewModel for ValidationModel {
    fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl BindModel for ValidationModel {
    fn bind(ctx: &BindingContext<'_>) -> Binding<Self> {
        let mut errors = Vec::new();
        let model = ValidationModel {
            age: ctx.parsed("Age", &mut errors),
            name: ctx.string("Name"),
            income: ctx.parsed("Income", &mut errors),
            has_salary: ctx.flag("HasSalary"),
            message: None,
        };
        Binding { model, errors }
    }
}

impl Validatable for ValidationModel {
    fn field_rules() -> &'static [FieldRules] {
        &VALIDATION_RULES
    }

    fn field_value(&self, name: &str) -> FieldValue<'_> {
        match name {
            "Age" => self.age.into(),
            "Name" => self.name.as_deref().into(),
            "Income" => self.income.into(),
            "HasSalary" => FieldValue::Bool(self.has_salary),
            _ => FieldValue::Absent,
        }
    }

    fn validate_object(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.has_salary && self.income.is_none_or(|income| income < 0) {
            errors.push(ValidationError::new("The field Income cannot be negative", ["Income"]));
        }
        errors
    }
}

/// Identifier plus message; also the XML payload of `TestActionResult`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultModel {
    pub id: Option<String>,
    pub message: Option<String>,
}

impl ViewModel for ResultModel {
    fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl BindModel for ResultModel {
    fn bind(ctx: &BindingContext<'_>) -> Binding<Self> {
        Binding::ok(ResultModel {
            id: ctx.string("Id"),
            message: ctx.string("Message"),
        })
    }
}

impl XmlSerialize for ResultModel {
    fn root_name(&self) -> &str {
        "ResultModel"
    }

    fn write_fields(&self, writer: &mut XmlWriter) {
        writer.element("Id", self.id.as_deref());
        writer.element("Message", self.message.as_deref());
    }
}

/// Carries the measured execution time back to the view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FilterModel {
    pub method_name: String,
    pub execution_time: f64,
}

impl FilterModel {
    pub fn new(method_name: &str) -> Self {
        Self {
            method_name: method_name.to_string(),
            execution_time: 0.0,
        }
    }
}

impl ViewModel for FilterModel {
    fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    fn execution_time_mut(&mut self) -> Option<&mut f64> {
        Some(&mut self.execution_time)
    }
}
