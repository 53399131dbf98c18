//! The demo application: controllers, models and their registrations.
//!
//! # Registrations
//! - Routes: ignore `.axd` resources, the `mygithub` redirect, one route per
//!   action, then the conventional `{controller}/{action}/{id}` fallback
//! - Controllers: every `*Controller` in `controllers.rs`
//! - Binders: `DateModelBinder` for `DateModel`
//! - Filters: a global execution-time filter targeting
//!   `TestFilter/FilterByGlobalFilter`, a provider for
//!   `TestFilter/FilterByFilterProvider`, and a route filter on
//!   `TestFilter/FilterByCustomActionFilterAttribute`

pub mod controllers;
pub mod models;

use std::sync::Arc;

use crate::controller::{ControllerDescriptor, ResolutionPolicy};
use crate::dispatch::MvcConfigurationBuilder;
use crate::filter::{ActionFilter, ActionFilterProvider, ExecutionTimeFilter, FilterSpec};
use crate::routing::{RouteDefinition, SetConstraint};

use controllers::{
    HomeController, TestActionResultController, TestFilterController, TestModelBindingController,
    TestRouteConstraintController, TestValidationController, TestValueProviderController,
};
use models::DateModelBinder;

/// Namespace the demo controllers are registered under.
pub const CONTROLLER_NAMESPACE: &str = "app::controllers";

pub const GITHUB_LOCATION: &str = "https://github.com/drioemgaoin";

pub fn controller_descriptors() -> Vec<ControllerDescriptor> {
    let ns = CONTROLLER_NAMESPACE;
    vec![
        ControllerDescriptor::of::<HomeController>(ns, "HomeController"),
        ControllerDescriptor::of::<TestRouteConstraintController>(ns, "TestRouteConstraintController"),
        ControllerDescriptor::of::<TestModelBindingController>(ns, "TestModelBindingController"),
        ControllerDescriptor::of::<TestValidationController>(ns, "TestValidationController"),
        ControllerDescriptor::of::<TestValueProviderController>(ns, "TestValueProviderController"),
        ControllerDescriptor::of::<TestActionResultController>(ns, "TestActionResultController"),
        ControllerDescriptor::of::<TestFilterController>(ns, "TestFilterController"),
    ]
}

/// Application routes in match order. The conventional fallback is last.
pub fn routes() -> Vec<RouteDefinition> {
    let mut routes = vec![
        RouteDefinition::ignore("{resource}.axd/{*pathInfo}"),
        RouteDefinition::redirect("mygithub", "mygithub", GITHUB_LOCATION),
        RouteDefinition::mvc("Home", "", "Home", "Index"),
        // Route constraints
        RouteDefinition::mvc("TestRouteConstraint", "TestRouteConstraint", "TestRouteConstraint", "Index"),
        RouteDefinition::mvc(
            "TestRouteConstraint_RegularExpressionConstraint",
            "TestRouteConstraint/Regexp/{user:regex(rdiegoni)}",
            "TestRouteConstraint",
            "RegularExpressionConstraint",
        ),
        RouteDefinition::mvc(
            "TestRouteConstraint_CustomRouteConstraint",
            "TestRouteConstraint/Custom/{user:match(rdiegoni)}",
            "TestRouteConstraint",
            "CustomRouteConstraint",
        ),
        RouteDefinition::mvc(
            "TestRouteConstraint_Match",
            "TestRouteConstraint/Match/{user?}",
            "TestRouteConstraint",
            "Match",
        )
        .with_constraint("user", Arc::new(SetConstraint::from_values(["rdiegoni"]))),
        // Model binding
        RouteDefinition::mvc("TestModelBinding", "TestModelBinding", "TestModelBinding", "Index").get(),
        RouteDefinition::mvc("TestModelBinding_Post", "TestModelBinding", "TestModelBinding", "TestModelBinding").post(),
        // Validation
        RouteDefinition::mvc("TestValidation", "TestValidation", "TestValidation", "Index").get(),
        RouteDefinition::mvc("TestValidation_Post", "TestValidation", "TestValidation", "Validate").post(),
        // Value providers
        RouteDefinition::mvc("TestValueProvider", "TestValueProvider", "TestValueProvider", "Index").get(),
        RouteDefinition::mvc("TestValueProvider_Post", "TestValueProvider", "TestValueProvider", "Index").post(),
        // Action results
        RouteDefinition::mvc("TestActionResult", "TestActionResult", "TestActionResult", "Index").get(),
        RouteDefinition::mvc("TestActionResult_Post", "TestActionResult", "TestActionResult", "TestActionResult").post(),
        // Filters
        RouteDefinition::mvc("TestFilter", "TestFilter", "TestFilter", "Index"),
    ];

    for action in [
        "FilterByOverrideMethod",
        "FilterByCustomActionFilterAttribute",
        "FilterByFilterProvider",
        "FilterByGlobalFilter",
    ] {
        let route = RouteDefinition::mvc(action, action, "TestFilter", action);
        routes.push(if action == "FilterByCustomActionFilterAttribute" {
            route.with_filter(FilterSpec::ExecutionTime)
        } else {
            route
        });
    }

    routes.push(
        RouteDefinition::conventional("Default", "{controller?}/{action?}/{id?}")
            .with_default("controller", "Home")
            .with_default("action", "Index"),
    );
    routes
}

/// Register the whole demo application on `builder`.
///
/// `extra_routes` are inserted before the conventional fallback so they can
/// still be reached.
pub fn configure(builder: MvcConfigurationBuilder, extra_routes: Vec<RouteDefinition>) -> MvcConfigurationBuilder {
    let mut routes = routes();
    let fallback = routes.pop();
    routes.extend(extra_routes);
    routes.extend(fallback);

    let builder = controller_descriptors()
        .into_iter()
        .fold(builder.routes(routes), |builder, descriptor| builder.controller(descriptor));

    builder
        .binder(DateModelBinder::default())
        .global_filter(|| {
            Box::new(ExecutionTimeFilter::for_action("TestFilter", "FilterByGlobalFilter")) as Box<dyn ActionFilter>
        })
        .filter_provider(ActionFilterProvider::new().with(
            "TestFilter",
            "FilterByFilterProvider",
            FilterSpec::ExecutionTime,
        ))
}

/// The demo application with no extra routes.
pub fn builder(policy: ResolutionPolicy) -> MvcConfigurationBuilder {
    configure(MvcConfigurationBuilder::new(policy), Vec::new())
}
