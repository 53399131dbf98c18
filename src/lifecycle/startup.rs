//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn a validated `AppConfig` into the immutable `MvcConfiguration`
//! - Pick the controller resolution policy and apply invoker overrides
//! - Append configured routes ahead of the conventional fallback
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The configuration is built once; nothing here runs per request

use std::sync::Arc;

use crate::app;
use crate::config::{AppConfig, ConfigError, PolicyKind};
use crate::controller::{ResolutionPolicy, TracingActionInvoker};
use crate::dispatch::{Dispatcher, MvcConfiguration, MvcConfigurationBuilder};

/// The resolution policy selected by `config.dispatch`.
pub fn resolution_policy(config: &AppConfig) -> ResolutionPolicy {
    match config.dispatch.policy {
        PolicyKind::Namespace => ResolutionPolicy::Namespace(config.dispatch.namespace.clone()),
        PolicyKind::Convention => ResolutionPolicy::ConventionScan,
    }
}

/// Build the dispatch configuration for the demo application.
pub fn build_configuration(config: &AppConfig) -> Result<MvcConfiguration, ConfigError> {
    let policy = resolution_policy(config);

    let extra_routes = config
        .routes
        .iter()
        .map(|route| route.to_definition())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|violation| ConfigError::Validation(vec![violation]))?;

    let mut builder = app::configure(MvcConfigurationBuilder::new(policy.clone()), extra_routes);

    if !config.dispatch.rewire.is_empty() {
        if policy == ResolutionPolicy::ConventionScan {
            for token in &config.dispatch.rewire {
                builder
                    .controllers_mut()
                    .override_invoker(token, Arc::new(TracingActionInvoker::default()));
                tracing::info!(controller = %token, "Action invoker replaced");
            }
        } else {
            tracing::warn!(
                controllers = ?config.dispatch.rewire,
                "dispatch.rewire ignored under the namespace policy"
            );
        }
    }

    let configuration = builder.build()?;
    tracing::info!(
        routes = configuration.routes().len(),
        controllers = configuration.controllers().descriptors().len(),
        policy = ?policy,
        "Dispatch configuration built"
    );
    Ok(configuration)
}

/// Build the dispatcher, sharing the configuration behind an `Arc`.
pub fn build_dispatcher(config: &AppConfig) -> Result<Dispatcher, ConfigError> {
    Ok(Dispatcher::new(Arc::new(build_configuration(config)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    #[test]
    fn test_default_config_builds_demo_app() {
        let configuration = build_configuration(&AppConfig::default()).unwrap();
        assert_eq!(configuration.controllers().policy(), &ResolutionPolicy::ConventionScan);
        assert_eq!(configuration.controllers().descriptors().len(), 7);
        let last = configuration.routes().routes().last().unwrap();
        assert_eq!(last.name(), "Default");
    }

    #[test]
    fn test_configured_routes_precede_fallback() {
        let config = parse_config(
            r#"
            [dispatch]
            policy = "namespace"
            namespace = "app::controllers"

            [[routes]]
            name = "members"
            pattern = "members/{user}"
            defaults = { controller = "TestRouteConstraint", action = "Match" }
            "#,
        )
        .unwrap();
        let configuration = build_configuration(&config).unwrap();

        let names: Vec<_> = configuration.routes().routes().iter().map(|r| r.name()).collect();
        let members = names.iter().position(|n| *n == "members").unwrap();
        assert_eq!(members, names.len() - 2);
        assert_eq!(
            configuration.controllers().policy(),
            &ResolutionPolicy::Namespace("app::controllers".to_string())
        );
    }

    #[test]
    fn test_rewire_overrides_invoker() {
        let mut config = AppConfig::default();
        config.dispatch.rewire = vec!["TestFilter".to_string()];
        let configuration = build_configuration(&config).unwrap();

        let lease = configuration.controllers().create("TestFilter").unwrap();
        assert!(format!("{:?}", lease.invoker()).contains("TracingActionInvoker"));
        let lease = configuration.controllers().create("Home").unwrap();
        assert!(format!("{:?}", lease.invoker()).contains("ControllerActionInvoker"));
    }
}
