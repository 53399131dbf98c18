//! Request dispatch.
//!
//! # Data Flow
//! ```text
//! DispatchRequest
//!     → RouteTable::match_request (first match wins)
//!     → Ignore → 404 | Redirect → 302 | Mvc ↓
//!     → ControllerFactory::create (NotFound → 404)
//!     → canonical action lookup (unknown → 404)
//!     → action owned by a direct route but reached another way → 404
//!     → value providers, ActionContext, filter chain
//!     → ControllerLease::invoke (error → 500)
//!     → lease released, result rendered
//! ```
//!
//! # Design Decisions
//! - `MvcConfiguration` is built once and never mutated; the dispatcher
//!   only reads it, so no locking is needed between requests
//! - Every request-scoped failure becomes a status code, never a panic

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::binding::{
    CookieValueProviderFactory, FormValueProviderFactory, ModelBinder, ModelBinders, QueryValueProviderFactory,
    RequestData, RouteValueProviderFactory, ValueProviderCollection, ValueProviderFactory,
};
use crate::controller::{ActionContext, ControllerDescriptor, ControllerFactory, ResolutionPolicy};
use crate::filter::{ActionFilter, FilterProvider, FilterRegistry};
use crate::observability::metrics;
use crate::result::{redirect_response, JsonViewRenderer, ViewRenderer};
use crate::routing::{ConstraintMap, RouteDefinition, RouteError, RouteHandlerKind, RouteTable};

/// An inbound request, independent of the HTTP server in front.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl DispatchRequest {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    fn into_request_data(self) -> RequestData {
        RequestData::from_parts(self.method, &self.uri, self.headers, &self.body)
    }
}

/// Everything the dispatcher needs, fixed at startup.
pub struct MvcConfiguration {
    routes: RouteTable,
    controllers: ControllerFactory,
    binders: Arc<ModelBinders>,
    value_providers: Vec<Box<dyn ValueProviderFactory>>,
    filters: FilterRegistry,
    renderer: Box<dyn ViewRenderer>,
}

impl fmt::Debug for MvcConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MvcConfiguration")
            .field("routes", &self.routes.len())
            .field("controllers", &self.controllers)
            .field("binders", &self.binders)
            .field("value_providers", &self.value_providers.len())
            .field("filters", &self.filters)
            .finish()
    }
}

impl MvcConfiguration {
    pub fn builder(policy: ResolutionPolicy) -> MvcConfigurationBuilder {
        MvcConfigurationBuilder::new(policy)
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn controllers(&self) -> &ControllerFactory {
        &self.controllers
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }
}

/// Collects registrations, then compiles them into an `MvcConfiguration`.
pub struct MvcConfigurationBuilder {
    constraint_map: ConstraintMap,
    routes: Vec<RouteDefinition>,
    controllers: ControllerFactory,
    binders: ModelBinders,
    value_providers: Vec<Box<dyn ValueProviderFactory>>,
    filters: FilterRegistry,
    renderer: Box<dyn ViewRenderer>,
}

impl MvcConfigurationBuilder {
    /// Starts with the built-in constraint tokens and the standard providers
    /// in lookup order: form, route, query string, cookies.
    pub fn new(policy: ResolutionPolicy) -> Self {
        Self {
            constraint_map: ConstraintMap::default(),
            routes: Vec::new(),
            controllers: ControllerFactory::new(policy),
            binders: ModelBinders::new(),
            value_providers: vec![
                Box::new(FormValueProviderFactory),
                Box::new(RouteValueProviderFactory),
                Box::new(QueryValueProviderFactory),
                Box::new(CookieValueProviderFactory),
            ],
            filters: FilterRegistry::new(),
            renderer: Box::new(JsonViewRenderer),
        }
    }

    pub fn constraint_map_mut(&mut self) -> &mut ConstraintMap {
        &mut self.constraint_map
    }

    pub fn route(mut self, route: RouteDefinition) -> Self {
        self.routes.push(route);
        self
    }

    pub fn routes(mut self, routes: impl IntoIterator<Item = RouteDefinition>) -> Self {
        self.routes.extend(routes);
        self
    }

    pub fn controller(mut self, descriptor: ControllerDescriptor) -> Self {
        self.controllers.register(descriptor);
        self
    }

    pub fn controllers_mut(&mut self) -> &mut ControllerFactory {
        &mut self.controllers
    }

    pub fn binder<B>(mut self, binder: B) -> Self
    where
        B: ModelBinder + 'static,
        B::Model: 'static,
    {
        self.binders.register(binder);
        self
    }

    /// Appended after the standard providers.
    pub fn value_provider<F: ValueProviderFactory + 'static>(mut self, factory: F) -> Self {
        self.value_providers.push(Box::new(factory));
        self
    }

    pub fn global_filter<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn ActionFilter> + Send + Sync + 'static,
    {
        self.filters.add_global(factory);
        self
    }

    pub fn filter_provider<P: FilterProvider + 'static>(mut self, provider: P) -> Self {
        self.filters.add_provider(provider);
        self
    }

    pub fn renderer<R: ViewRenderer + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn build(self) -> Result<MvcConfiguration, RouteError> {
        let routes = RouteTable::compile(self.routes, &self.constraint_map)?;
        Ok(MvcConfiguration {
            routes,
            controllers: self.controllers,
            binders: Arc::new(self.binders),
            value_providers: self.value_providers,
            filters: self.filters,
            renderer: self.renderer,
        })
    }
}

/// The dispatch entry point.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    config: Arc<MvcConfiguration>,
}

impl Dispatcher {
    pub fn new(config: Arc<MvcConfiguration>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MvcConfiguration {
        &self.config
    }

    pub fn dispatch(&self, request: DispatchRequest) -> Response {
        let start = Instant::now();
        let request = request.into_request_data();

        let matched = match self.config.routes.match_request(&request.method, &request.path) {
            Ok(Some(matched)) => matched,
            Ok(None) => return not_found("no_route", &request.path),
            Err(e) => {
                tracing::warn!(path = %request.path, error = %e, "Route evaluation failed");
                return not_found("route_error", &request.path);
            }
        };

        match matched.route.handler() {
            RouteHandlerKind::Ignore => return not_found("ignored", &request.path),
            RouteHandlerKind::Redirect { location } => {
                tracing::debug!(route = %matched.route.name(), location = %location, "Redirecting");
                return redirect_response(location);
            }
            RouteHandlerKind::Mvc => {}
        }

        let route = matched.route;
        let values = matched.values;
        let (Some(token), Some(action)) = (values.controller(), values.action()) else {
            return not_found("no_controller", &request.path);
        };

        let mut lease = match self.config.controllers.create(token) {
            Ok(lease) => lease,
            Err(e) => {
                tracing::debug!(error = %e, "Controller not resolved");
                return not_found("no_controller", &request.path);
            }
        };
        let Some(action) = lease.controller().find_action(action) else {
            tracing::debug!(controller = %lease.name(), action = %action, "Unknown action");
            return not_found("no_action", &request.path);
        };
        let controller = lease.name().to_string();

        if route.action_target().is_none() && self.config.routes.is_claimed(&controller, action) {
            tracing::debug!(
                route = %route.name(),
                controller = %controller,
                action = %action,
                "Action is only reachable through its own route"
            );
            return not_found("claimed_action", &request.path);
        }

        tracing::debug!(
            route = %route.name(),
            controller = %controller,
            action = %action,
            "Route matched"
        );

        let providers = self
            .config
            .value_providers
            .iter()
            .filter_map(|factory| factory.create(&request, &values))
            .collect();
        let filters = self.config.filters.chain_for(&controller, action, route.filters());
        let mut ctx = ActionContext::new(
            &controller,
            action,
            values,
            request,
            ValueProviderCollection::new(providers),
            self.config.binders.clone(),
        );

        let outcome = lease.invoke(&mut ctx, filters);
        self.config.controllers.release(lease);

        let response = match outcome {
            Ok(result) => {
                let cookies = ctx.take_response_cookies();
                result.into_response(self.config.renderer.as_ref(), &cookies)
            }
            Err(e) => {
                tracing::error!(controller = %controller, action = %action, error = %e, "Action failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        };

        metrics::record_dispatch(&controller, action, response.status().as_u16(), start);
        response
    }
}

fn not_found(reason: &'static str, path: &str) -> Response {
    tracing::debug!(path = %path, reason, "Not found");
    metrics::record_not_found(reason);
    StatusCode::NOT_FOUND.into_response()
}
