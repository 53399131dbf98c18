//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes in registration order
//! - Look up the first route whose shape, method and constraints fit
//! - Return matched route or explicit no-match
//! - Record the controller/action pairs pinned by direct routes
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in registration order (acceptable for typical route counts)
//! - Explicit NoMatch rather than silent default

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use axum::http::Method;

use crate::filter::FilterSpec;
use crate::routing::constraint::{ConstraintMap, RouteConstraint};
use crate::routing::pattern::RoutePattern;
use crate::routing::{RouteError, RouteValues};

/// What a matched route hands the request to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteHandlerKind {
    /// Controller resolution, binding, filters and action invocation.
    Mvc,
    /// Answer with a redirect without touching controllers.
    Redirect { location: String },
    /// Stop routing here; the request is answered with not found.
    Ignore,
}

/// Declarative route registration.
#[derive(Clone)]
pub struct RouteDefinition {
    pub name: String,
    pub pattern: String,
    /// Allowed methods; empty means any.
    pub methods: Vec<Method>,
    pub defaults: Vec<(String, String)>,
    pub constraints: Vec<(String, Arc<dyn RouteConstraint>)>,
    /// Filters attached to this action, run in declaration order.
    pub filters: Vec<FilterSpec>,
    pub handler: RouteHandlerKind,
}

impl fmt::Debug for RouteDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDefinition")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .field("methods", &self.methods)
            .field("defaults", &self.defaults)
            .field("constraints", &self.constraints.len())
            .field("filters", &self.filters)
            .field("handler", &self.handler)
            .finish()
    }
}

impl RouteDefinition {
    /// A route dispatched to `controller`/`action` through the MVC pipeline.
    pub fn mvc(name: &str, pattern: &str, controller: &str, action: &str) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
            methods: Vec::new(),
            defaults: vec![
                ("controller".to_string(), controller.to_string()),
                ("action".to_string(), action.to_string()),
            ],
            constraints: Vec::new(),
            filters: Vec::new(),
            handler: RouteHandlerKind::Mvc,
        }
    }

    /// A conventional route whose controller/action come from the URL.
    pub fn conventional(name: &str, pattern: &str) -> Self {
        Self {
            defaults: Vec::new(),
            ..Self::mvc(name, pattern, "", "")
        }
    }

    pub fn redirect(name: &str, pattern: &str, location: &str) -> Self {
        Self {
            handler: RouteHandlerKind::Redirect {
                location: location.to_string(),
            },
            defaults: Vec::new(),
            ..Self::mvc(name, pattern, "", "")
        }
    }

    pub fn ignore(pattern: &str) -> Self {
        Self {
            handler: RouteHandlerKind::Ignore,
            defaults: Vec::new(),
            ..Self::mvc(&format!("ignore:{}", pattern), pattern, "", "")
        }
    }

    pub fn get(mut self) -> Self {
        self.methods = vec![Method::GET];
        self
    }

    pub fn post(mut self) -> Self {
        self.methods = vec![Method::POST];
        self
    }

    pub fn with_methods(mut self, methods: Vec<Method>) -> Self {
        self.methods = methods;
        self
    }

    pub fn with_default(mut self, key: &str, value: &str) -> Self {
        self.defaults.retain(|(k, _)| !k.eq_ignore_ascii_case(key));
        self.defaults.push((key.to_string(), value.to_string()));
        self
    }

    /// Attach an external constraint object to a parameter.
    pub fn with_constraint(mut self, parameter: &str, constraint: Arc<dyn RouteConstraint>) -> Self {
        self.constraints.push((parameter.to_string(), constraint));
        self
    }

    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filters.push(filter);
        self
    }
}

/// A compiled, immutable route.
pub struct Route {
    name: String,
    pattern: RoutePattern,
    methods: Vec<Method>,
    defaults: RouteValues,
    constraints: Vec<(String, Arc<dyn RouteConstraint>)>,
    filters: Vec<FilterSpec>,
    handler: RouteHandlerKind,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("pattern", &self.pattern.template())
            .field("methods", &self.methods)
            .field("handler", &self.handler)
            .finish()
    }
}

impl Route {
    pub fn compile(definition: RouteDefinition, map: &ConstraintMap) -> Result<Self, RouteError> {
        let pattern = RoutePattern::parse(&definition.pattern, map)?;

        let mut defaults = RouteValues::default();
        for (key, value) in &definition.defaults {
            defaults.insert(key, value.clone());
        }

        let mut constraints = pattern.inline_constraints();
        for (parameter, constraint) in definition.constraints {
            if !pattern.has_parameter(&parameter) && !defaults.contains_key(&parameter) {
                return Err(RouteError::UnknownParameter(parameter));
            }
            // Attached constraints always see the value; an absent one is an error.
            constraints.push((parameter, constraint));
        }

        Ok(Self {
            name: definition.name,
            pattern,
            methods: definition.methods,
            defaults,
            constraints,
            filters: definition.filters,
            handler: definition.handler,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &str {
        self.pattern.template()
    }

    pub fn filters(&self) -> &[FilterSpec] {
        &self.filters
    }

    pub fn handler(&self) -> &RouteHandlerKind {
        &self.handler
    }

    /// The controller/action pair this route pins, when neither is taken
    /// from the URL.
    pub fn action_target(&self) -> Option<(&str, &str)> {
        if self.handler != RouteHandlerKind::Mvc
            || self.pattern.has_parameter("controller")
            || self.pattern.has_parameter("action")
        {
            return None;
        }
        match (self.defaults.controller(), self.defaults.action()) {
            (Some(controller), Some(action)) if !controller.is_empty() && !action.is_empty() => {
                Some((controller, action))
            }
            _ => None,
        }
    }

    pub fn allows_method(&self, method: &Method) -> bool {
        self.methods.is_empty() || self.methods.iter().any(|m| m == method)
    }

    /// Returns the captured values when this route accepts the request.
    pub fn try_match(&self, method: &Method, path: &str) -> Result<Option<RouteValues>, RouteError> {
        if !self.allows_method(method) {
            return Ok(None);
        }
        let Some(mut values) = self.pattern.capture(path) else {
            return Ok(None);
        };
        for (key, value) in self.defaults.iter() {
            if !values.contains_key(key) && !value.is_empty() {
                values.insert(key, value);
            }
        }
        for (parameter, constraint) in &self.constraints {
            if !constraint.matches(parameter, &values)? {
                tracing::trace!(route = %self.name, parameter = %parameter, "Constraint rejected value");
                return Ok(None);
            }
        }
        Ok(Some(values))
    }
}

/// A successful lookup.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub values: RouteValues,
}

/// Ordered, immutable route collection.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    /// Lower-cased pairs owned by direct routes.
    claimed: HashSet<(String, String)>,
}

impl RouteTable {
    /// Compile all definitions; the first error aborts.
    pub fn compile(definitions: Vec<RouteDefinition>, map: &ConstraintMap) -> Result<Self, RouteError> {
        let routes = definitions
            .into_iter()
            .map(|d| Route::compile(d, map))
            .collect::<Result<Vec<_>, _>>()?;
        let claimed = routes
            .iter()
            .filter_map(Route::action_target)
            .map(|(controller, action)| (controller.to_lowercase(), action.to_lowercase()))
            .collect();
        Ok(Self { routes, claimed })
    }

    /// Whether a direct route owns `controller`/`action`. Such actions are
    /// only reachable through their own routes.
    pub fn is_claimed(&self, controller: &str, action: &str) -> bool {
        self.claimed
            .contains(&(controller.to_lowercase(), action.to_lowercase()))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// First route accepting the request wins.
    pub fn match_request(&self, method: &Method, path: &str) -> Result<Option<RouteMatch<'_>>, RouteError> {
        for route in &self.routes {
            if let Some(values) = route.try_match(method, path)? {
                return Ok(Some(RouteMatch { route, values }));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::constraint::SetConstraint;

    fn table(definitions: Vec<RouteDefinition>) -> RouteTable {
        RouteTable::compile(definitions, &ConstraintMap::default()).unwrap()
    }

    #[test]
    fn test_first_match_wins() {
        let routes = table(vec![
            RouteDefinition::mvc("custom", "TestRouteConstraint/Custom/{user:match(rdiegoni)}", "TestRouteConstraint", "CustomRouteConstraint"),
            RouteDefinition::conventional("default", "{controller}/{action}/{id?}"),
        ]);

        let m = routes
            .match_request(&Method::GET, "/TestRouteConstraint/Custom/RDiegoni")
            .unwrap()
            .unwrap();
        assert_eq!(m.route.name(), "custom");
        assert_eq!(m.values.action(), Some("CustomRouteConstraint"));
        assert_eq!(m.values.get("user"), Some("RDiegoni"));

        // Constraint rejects, so the conventional route picks it up.
        let m = routes
            .match_request(&Method::GET, "/TestRouteConstraint/Custom/bob")
            .unwrap()
            .unwrap();
        assert_eq!(m.route.name(), "default");
        assert_eq!(m.values.controller(), Some("TestRouteConstraint"));
        assert_eq!(m.values.get("id"), Some("bob"));
    }

    #[test]
    fn test_method_constraint() {
        let routes = table(vec![
            RouteDefinition::mvc("get", "TestValidation", "TestValidation", "Index").get(),
            RouteDefinition::mvc("post", "TestValidation", "TestValidation", "Validate").post(),
        ]);
        let m = routes.match_request(&Method::POST, "/testvalidation").unwrap().unwrap();
        assert_eq!(m.values.action(), Some("Validate"));
        assert!(routes.match_request(&Method::PUT, "/testvalidation").unwrap().is_none());
    }

    #[test]
    fn test_external_constraint() {
        let routes = table(vec![RouteDefinition::mvc("admin", "TestRouteConstraint/Match/{user}", "TestRouteConstraint", "Match")
            .with_constraint("user", Arc::new(SetConstraint::parse("rdiegoni")))]);
        assert!(routes.match_request(&Method::GET, "/TestRouteConstraint/Match/RDIEGONI").unwrap().is_some());
        assert!(routes.match_request(&Method::GET, "/TestRouteConstraint/Match/eve").unwrap().is_none());
    }

    #[test]
    fn test_constraint_on_unknown_parameter_fails_compile() {
        let result = RouteTable::compile(
            vec![RouteDefinition::mvc("bad", "x/{user}", "X", "Y").with_constraint("nobody", Arc::new(SetConstraint::parse("a")))],
            &ConstraintMap::default(),
        );
        assert!(matches!(result, Err(RouteError::UnknownParameter(p)) if p == "nobody"));
    }

    #[test]
    fn test_constraint_on_missing_default_is_error() {
        // Declared through defaults with an empty value, so nothing is captured.
        let routes = table(vec![RouteDefinition::mvc("r", "x", "X", "Y")
            .with_default("user", "")
            .with_constraint("user", Arc::new(SetConstraint::parse("a")))]);
        let err = routes.match_request(&Method::GET, "/x").unwrap_err();
        assert_eq!(err, RouteError::MissingValue("user".to_string()));
    }

    #[test]
    fn test_external_constraint_on_optional_parameter_needs_a_value() {
        let routes = table(vec![RouteDefinition::mvc("admin", "TestRouteConstraint/Match/{user?}", "TestRouteConstraint", "Match")
            .with_constraint("user", Arc::new(SetConstraint::parse("rdiegoni")))]);
        assert!(routes.match_request(&Method::GET, "/TestRouteConstraint/Match/rdiegoni").unwrap().is_some());
        assert_eq!(
            routes.match_request(&Method::GET, "/TestRouteConstraint/Match").unwrap_err(),
            RouteError::MissingValue("user".to_string())
        );
    }

    #[test]
    fn test_direct_routes_claim_their_action() {
        let routes = table(vec![
            RouteDefinition::mvc("match", "TestRouteConstraint/Match/{user}", "TestRouteConstraint", "Match"),
            RouteDefinition::mvc("home", "", "Home", "Index"),
            RouteDefinition::redirect("github", "mygithub", "https://github.com/drioemgaoin"),
            RouteDefinition::conventional("default", "{controller?}/{action?}/{id?}")
                .with_default("controller", "Home")
                .with_default("action", "Index"),
        ]);

        assert_eq!(routes.routes()[0].action_target(), Some(("TestRouteConstraint", "Match")));
        assert!(routes.routes()[2].action_target().is_none());
        assert!(routes.routes()[3].action_target().is_none());
        assert!(routes.is_claimed("testrouteconstraint", "MATCH"));
        assert!(routes.is_claimed("Home", "Index"));
        assert!(!routes.is_claimed("TestRouteConstraint", "Index"));
    }

    #[test]
    fn test_ignore_and_redirect_routes() {
        let routes = table(vec![
            RouteDefinition::ignore("{resource}.axd/{*pathInfo}"),
            RouteDefinition::redirect("github", "mygithub", "https://github.com/drioemgaoin"),
        ]);
        let m = routes.match_request(&Method::GET, "/trace.axd").unwrap().unwrap();
        assert_eq!(m.route.handler(), &RouteHandlerKind::Ignore);
        let m = routes.match_request(&Method::GET, "/MyGithub").unwrap().unwrap();
        assert!(matches!(m.route.handler(), RouteHandlerKind::Redirect { .. }));
    }
}
