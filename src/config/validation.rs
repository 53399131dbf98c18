//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0, addresses parse)
//! - Compile configured routes against the constraint map
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ConfigViolation>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{AppConfig, PolicyKind};
use crate::routing::{ConstraintMap, Route, RouteError};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigViolation {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("listener.max_body_bytes must be greater than zero")]
    BodyLimit,

    #[error("timeouts.request_secs must be greater than zero")]
    RequestTimeout,

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    LogLevel(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),

    #[error("dispatch.namespace must not be empty for the namespace policy")]
    EmptyNamespace,

    #[error("routes[{0}] has an empty name")]
    EmptyRouteName(usize),

    #[error("route name '{0}' is used more than once")]
    DuplicateRoute(String),

    #[error("route '{route}' has unknown method '{method}'")]
    Method { route: String, method: String },

    #[error("route '{route}': {source}")]
    Route {
        route: String,
        #[source]
        source: RouteError,
    },
}

/// Check every semantic rule, collecting all violations.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ConfigViolation>> {
    let mut violations = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        violations.push(ConfigViolation::BindAddress(config.listener.bind_address.clone()));
    }
    if config.listener.max_body_bytes == 0 {
        violations.push(ConfigViolation::BodyLimit);
    }
    if config.timeouts.request_secs == 0 {
        violations.push(ConfigViolation::RequestTimeout);
    }

    let level = config.observability.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        violations.push(ConfigViolation::LogLevel(config.observability.log_level.clone()));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        violations.push(ConfigViolation::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.dispatch.policy == PolicyKind::Namespace && config.dispatch.namespace.trim().is_empty() {
        violations.push(ConfigViolation::EmptyNamespace);
    }

    let map = ConstraintMap::default();
    let mut names = HashSet::new();
    for (index, route) in config.routes.iter().enumerate() {
        if route.name.trim().is_empty() {
            violations.push(ConfigViolation::EmptyRouteName(index));
        } else if !names.insert(route.name.to_lowercase()) {
            violations.push(ConfigViolation::DuplicateRoute(route.name.clone()));
        }

        match route.to_definition() {
            Ok(definition) => {
                if let Err(source) = Route::compile(definition, &map) {
                    violations.push(ConfigViolation::Route {
                        route: route.name.clone(),
                        source,
                    });
                }
            }
            Err(violation) => violations.push(violation),
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouteConfig;

    fn route(name: &str, pattern: &str) -> RouteConfig {
        RouteConfig {
            name: name.to_string(),
            pattern: pattern.to_string(),
            methods: Vec::new(),
            defaults: Default::default(),
            constraints: Vec::new(),
            filters: Vec::new(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_violation() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "nowhere".to_string();
        config.timeouts.request_secs = 0;
        config.observability.log_level = "loud".to_string();
        config.dispatch.policy = PolicyKind::Namespace;
        config.dispatch.namespace = " ".to_string();
        config.routes = vec![
            route("a", "x/{id:nope}"),
            route("a", "y"),
            route("", "z"),
        ];

        let violations = validate_config(&config).unwrap_err();
        assert!(violations.contains(&ConfigViolation::BindAddress("nowhere".to_string())));
        assert!(violations.contains(&ConfigViolation::RequestTimeout));
        assert!(violations.contains(&ConfigViolation::LogLevel("loud".to_string())));
        assert!(violations.contains(&ConfigViolation::EmptyNamespace));
        assert!(violations.contains(&ConfigViolation::DuplicateRoute("a".to_string())));
        assert!(violations.contains(&ConfigViolation::EmptyRouteName(2)));
        assert!(violations.contains(&ConfigViolation::Route {
            route: "a".to_string(),
            source: RouteError::UnknownConstraint("nope".to_string()),
        }));
    }

    #[test]
    fn test_unknown_method() {
        let mut config = AppConfig::default();
        let mut r = route("r", "x");
        r.methods = vec!["GE T".to_string()];
        config.routes.push(r);
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ConfigViolation::Method {
                route: "r".to_string(),
                method: "GE T".to_string(),
            }]
        );
    }
}
