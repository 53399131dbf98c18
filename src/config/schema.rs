//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! dispatch service. All types derive Serde traits for deserialization
//! from TOML files.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::http::Method;
use serde::{Deserialize, Serialize};

use crate::config::validation::ConfigViolation;
use crate::filter::FilterSpec;
use crate::routing::{RegexConstraint, RouteConstraint, RouteDefinition, SetConstraint};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Controller resolution.
    pub dispatch: DispatchConfig,

    /// Extra conventional routes, tried after the application's own routes.
    pub routes: Vec<RouteConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Largest accepted request body.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Exporter listen address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Controller lookup policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Direct `<namespace>::<Token>Controller` lookup.
    Namespace,
    /// Scan of all registered `*Controller` types.
    #[default]
    Convention,
}

/// Controller resolution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub policy: PolicyKind,

    /// Namespace searched by the namespace policy.
    pub namespace: String,

    /// Controller tokens whose action invoker is replaced by the tracing
    /// invoker after construction. Convention policy only.
    pub rewire: Vec<String>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::Convention,
            namespace: crate::app::CONTROLLER_NAMESPACE.to_string(),
            rewire: Vec::new(),
        }
    }
}

/// An externally attached route constraint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintConfig {
    /// Case-insensitive membership in `values`.
    Set { parameter: String, values: Vec<String> },
    /// Whole-value regular expression match.
    Regex { parameter: String, pattern: String },
}

impl ConstraintConfig {
    pub fn parameter(&self) -> &str {
        match self {
            ConstraintConfig::Set { parameter, .. } | ConstraintConfig::Regex { parameter, .. } => parameter,
        }
    }
}

/// A configured route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging.
    pub name: String,

    /// URL template, e.g. `"reports/{year:int}/{month?}"`.
    pub pattern: String,

    /// Allowed HTTP methods; empty allows any.
    #[serde(default)]
    pub methods: Vec<String>,

    /// Default route values such as `controller` and `action`.
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,

    #[serde(default)]
    pub constraints: Vec<ConstraintConfig>,

    /// Filters attached to actions reached through this route.
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
}

impl RouteConfig {
    /// Translate into a route definition. Pattern errors surface later, at compile.
    pub fn to_definition(&self) -> Result<RouteDefinition, ConfigViolation> {
        let methods = self
            .methods
            .iter()
            .map(|m| {
                Method::from_bytes(m.to_uppercase().as_bytes()).map_err(|_| ConfigViolation::Method {
                    route: self.name.clone(),
                    method: m.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut definition = RouteDefinition::conventional(&self.name, &self.pattern).with_methods(methods);
        for (key, value) in &self.defaults {
            definition = definition.with_default(key, value);
        }
        for constraint in &self.constraints {
            let built: Arc<dyn RouteConstraint> = match constraint {
                ConstraintConfig::Set { values, .. } => Arc::new(SetConstraint::from_values(values)),
                ConstraintConfig::Regex { pattern, .. } => {
                    Arc::new(RegexConstraint::new(pattern).map_err(|source| ConfigViolation::Route {
                        route: self.name.clone(),
                        source,
                    })?)
                }
            };
            definition = definition.with_constraint(constraint.parameter(), built);
        }
        for filter in &self.filters {
            definition = definition.with_filter(filter.clone());
        }
        Ok(definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:8080");
        assert_eq!(config.dispatch.policy, PolicyKind::Convention);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_route_section() {
        let config: AppConfig = toml::from_str(
            r#"
            [observability]
            log_format = "json"

            [dispatch]
            policy = "namespace"
            namespace = "app::controllers"

            [[routes]]
            name = "reports"
            pattern = "reports/{user}"
            methods = ["get"]
            defaults = { controller = "TestRouteConstraint", action = "Match" }
            constraints = [
                { kind = "set", parameter = "user", values = ["alice", "Bob"] },
            ]
            filters = [{ kind = "execution_time" }]
            "#,
        )
        .unwrap();

        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.dispatch.policy, PolicyKind::Namespace);
        let route = &config.routes[0];
        assert_eq!(route.constraints[0].parameter(), "user");
        assert_eq!(route.filters, vec![FilterSpec::ExecutionTime]);

        let definition = route.to_definition().unwrap();
        assert_eq!(definition.methods, vec![Method::GET]);
        assert_eq!(definition.constraints.len(), 1);
        assert!(definition.defaults.iter().any(|(k, v)| k == "controller" && v == "TestRouteConstraint"));
    }

    #[test]
    fn test_bad_regex_is_reported_against_route() {
        let route = RouteConfig {
            name: "broken".to_string(),
            pattern: "x/{id}".to_string(),
            methods: Vec::new(),
            defaults: BTreeMap::new(),
            constraints: vec![ConstraintConfig::Regex {
                parameter: "id".to_string(),
                pattern: "(".to_string(),
            }],
            filters: Vec::new(),
        };
        assert!(matches!(
            route.to_definition(),
            Err(ConfigViolation::Route { route, .. }) if route == "broken"
        ));
    }
}
