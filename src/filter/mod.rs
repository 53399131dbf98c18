//! Action filter subsystem.
//!
//! # Data Flow
//! ```text
//! Global factories ─┐
//! Providers ────────┼─→ FilterRegistry::chain_for(controller, action, route filters)
//! Route filters ────┘       → FilterChain (scope precedence, then declaration order)
//!                           → before hooks outermost → innermost
//!                           → controller override hooks (innermost)
//!                           → action
//!                           → after hooks innermost → outermost
//! ```
//!
//! # Design Decisions
//! - Scope order, outermost first: global, provider, action (route), controller
//! - After hooks unwind in reverse, so when several filters write the same
//!   result field the outermost filter writes last and wins
//! - Filters are instantiated per invocation from factories; hooks take
//!   `&mut self`, so per-request timer state is never shared between
//!   concurrent requests. A filter instance shared across requests would
//!   need its own synchronization.

pub mod chain;
pub mod provider;
pub mod timing;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::controller::ActionContext;
use crate::result::ActionResult;

pub use chain::FilterChain;
pub use provider::{ActionFilterProvider, FilterProvider};
pub use timing::{ActionLogFilter, ExecutionTimeFilter};

/// Before/after hooks around an action.
pub trait ActionFilter: Send {
    fn name(&self) -> &'static str;

    fn on_action_executing(&mut self, _ctx: &ActionContext) {}

    fn on_action_executed(&mut self, _ctx: &ActionContext, _result: &mut ActionResult) {}
}

/// Where a filter was registered. Variant order is invocation nesting,
/// outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterScope {
    Global,
    Provider,
    Action,
    Controller,
}

/// Route-level filter configuration, interpreted into filter instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterSpec {
    /// Writes the measured action duration into the view model.
    ExecutionTime,
    /// Logs action start and end.
    ActionLog,
}

impl FilterSpec {
    pub fn instantiate(&self) -> Box<dyn ActionFilter> {
        match self {
            FilterSpec::ExecutionTime => Box::new(ExecutionTimeFilter::new()),
            FilterSpec::ActionLog => Box::new(ActionLogFilter::default()),
        }
    }
}

/// Produces a fresh filter instance for each invocation.
pub type FilterFactory = Arc<dyn Fn() -> Box<dyn ActionFilter> + Send + Sync>;

/// One applicable filter: (scope, order, instance).
pub struct ScopedFilter {
    pub scope: FilterScope,
    pub order: usize,
    pub filter: Box<dyn ActionFilter>,
}

impl fmt::Debug for ScopedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedFilter")
            .field("scope", &self.scope)
            .field("order", &self.order)
            .field("filter", &self.filter.name())
            .finish()
    }
}

/// Global filters and filter providers, fixed at startup.
#[derive(Default)]
pub struct FilterRegistry {
    global: Vec<FilterFactory>,
    providers: Vec<Arc<dyn FilterProvider>>,
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("global", &self.global.len())
            .field("providers", &self.providers.len())
            .finish()
    }
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_global<F>(&mut self, factory: F)
    where
        F: Fn() -> Box<dyn ActionFilter> + Send + Sync + 'static,
    {
        self.global.push(Arc::new(factory));
    }

    pub fn add_provider<P: FilterProvider + 'static>(&mut self, provider: P) {
        self.providers.push(Arc::new(provider));
    }

    /// All filters applicable to one action, in invocation order.
    ///
    /// Each provider is queried exactly once.
    pub fn chain_for(&self, controller: &str, action: &str, route_filters: &[FilterSpec]) -> FilterChain {
        let global = self.global.iter().map(|factory| (FilterScope::Global, factory()));
        let provided = self
            .providers
            .iter()
            .flat_map(|p| p.filters(controller, action))
            .map(|f| (FilterScope::Provider, f));
        let attributed = route_filters
            .iter()
            .map(|spec| (FilterScope::Action, spec.instantiate()));

        let filters = global
            .chain(provided)
            .chain(attributed)
            .enumerate()
            .map(|(order, (scope, filter))| ScopedFilter { scope, order, filter })
            .collect();
        FilterChain::new(filters)
    }
}
