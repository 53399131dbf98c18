//! Declarative field rules and their client-side descriptions.

use std::collections::BTreeMap;

use serde::Serialize;

/// A field value as seen by the rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Absent,
    Text(&'a str),
    Int(i64),
    Bool(bool),
}

impl<'a> From<Option<&'a str>> for FieldValue<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map(FieldValue::Text).unwrap_or(FieldValue::Absent)
    }
}

impl From<Option<i32>> for FieldValue<'_> {
    fn from(value: Option<i32>) -> Self {
        value
            .map(|v| FieldValue::Int(i64::from(v)))
            .unwrap_or(FieldValue::Absent)
    }
}

/// One declarative rule. `message` templates use `{0}` for the display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Required { message: Option<String> },
    Range { min: i64, max: i64, message: Option<String> },
    ExcludeChars { chars: String, message: Option<String> },
}

impl Rule {
    pub fn required() -> Self {
        Rule::Required { message: None }
    }

    pub fn range(min: i64, max: i64) -> Self {
        Rule::Range { min, max, message: None }
    }

    pub fn exclude_chars(chars: &str) -> Self {
        Rule::ExcludeChars {
            chars: chars.to_string(),
            message: None,
        }
    }

    /// Replace the default message template.
    pub fn with_message(self, text: &str) -> Self {
        let text = Some(text.to_string());
        match self {
            Rule::Required { .. } => Rule::Required { message: text },
            Rule::Range { min, max, .. } => Rule::Range { min, max, message: text },
            Rule::ExcludeChars { chars, .. } => Rule::ExcludeChars { chars, message: text },
        }
    }

    fn template(&self) -> String {
        match self {
            Rule::Required { message } => message
                .clone()
                .unwrap_or_else(|| "The {0} field is required.".to_string()),
            Rule::Range { min, max, message } => message
                .clone()
                .unwrap_or_else(|| format!("The field {{0}} must be between {} and {}.", min, max)),
            Rule::ExcludeChars { message, .. } => message
                .clone()
                .unwrap_or_else(|| "The field {0} contains invalid character.".to_string()),
        }
    }

    pub fn format_message(&self, display_name: &str) -> String {
        self.template().replace("{0}", display_name)
    }

    /// Returns the error message when the value violates the rule.
    ///
    /// Only `Required` looks at absent values; the other rules pass them.
    pub fn check(&self, display_name: &str, value: FieldValue<'_>) -> Option<String> {
        let valid = match (self, value) {
            (Rule::Required { .. }, FieldValue::Absent) => false,
            (Rule::Required { .. }, FieldValue::Text(text)) => !text.trim().is_empty(),
            (Rule::Required { .. }, _) => true,
            (Rule::Range { min, max, .. }, FieldValue::Int(v)) => v >= *min && v <= *max,
            (Rule::Range { min, max, .. }, FieldValue::Text(text)) => text
                .trim()
                .parse::<i64>()
                .map(|v| v >= *min && v <= *max)
                .unwrap_or(false),
            (Rule::Range { .. }, _) => true,
            (Rule::ExcludeChars { chars, .. }, FieldValue::Text(text)) => {
                !text.chars().any(|c| chars.contains(c))
            }
            (Rule::ExcludeChars { .. }, _) => true,
        };
        if valid {
            None
        } else {
            Some(self.format_message(display_name))
        }
    }

    /// Description a client can mirror: rule name plus parameters.
    pub fn client_rule(&self, display_name: &str) -> ClientRule {
        let mut parameters = BTreeMap::new();
        let validation_type = match self {
            Rule::Required { .. } => "required",
            Rule::Range { min, max, .. } => {
                parameters.insert("min".to_string(), min.to_string());
                parameters.insert("max".to_string(), max.to_string());
                "range"
            }
            Rule::ExcludeChars { chars, .. } => {
                parameters.insert("chars".to_string(), chars.clone());
                "exclude"
            }
        };
        ClientRule {
            validation_type: validation_type.to_string(),
            error_message: self.format_message(display_name),
            parameters,
        }
    }
}

/// Client-side mirror of a server rule. Not authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRule {
    pub validation_type: String,
    pub error_message: String,
    pub parameters: BTreeMap<String, String>,
}

/// Rules attached to one field.
#[derive(Debug, Clone)]
pub struct FieldRules {
    pub name: &'static str,
    pub display_name: &'static str,
    pub rules: Vec<Rule>,
}

impl FieldRules {
    pub fn new(name: &'static str, rules: Vec<Rule>) -> Self {
        Self {
            name,
            display_name: name,
            rules,
        }
    }

    pub fn client_rules(&self) -> Vec<ClientRule> {
        self.rules
            .iter()
            .map(|r| r.client_rule(self.display_name))
            .collect()
    }
}
