//! Controllers and their resolution.
//!
//! # Data Flow
//! ```text
//! RouteValues["controller"]
//!     → factory.rs (registry lookup under the configured policy)
//!     → ControllerLease (instance + action invoker)
//!     → invoker.rs (filter chain around the action)
//!     → lease dropped → controller disposed
//! ```
//!
//! # Design Decisions
//! - Controllers are registered explicitly at startup; no runtime type scanning
//! - One instance per request
//! - Disposal is tied to the lease's `Drop`, so it runs on success, on error
//!   returns and while unwinding from a panic

pub mod context;
pub mod factory;
pub mod invoker;

use thiserror::Error;

use crate::result::ActionResult;

pub use context::ActionContext;
pub use factory::{ControllerDescriptor, ControllerFactory, ControllerLease, ResolutionPolicy, ResolveError};
pub use invoker::{ActionInvoker, ControllerActionInvoker, TracingActionInvoker};

/// Errors raised by an action.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("controller '{controller}' has no action '{action}'")]
    UnknownAction { controller: String, action: String },

    #[error("action failed: {0}")]
    Failed(String),

    #[error("view data serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A request handler grouping several actions.
pub trait Controller: Send {
    /// Action names this controller answers, in canonical casing.
    fn actions(&self) -> &'static [&'static str];

    fn execute(&mut self, action: &str, ctx: &mut ActionContext) -> Result<ActionResult, ActionError>;

    /// Innermost before hook, after all registered filters.
    fn on_action_executing(&mut self, _ctx: &ActionContext) {}

    /// Innermost after hook, before all registered filters.
    fn on_action_executed(&mut self, _ctx: &ActionContext, _result: &mut ActionResult) {}

    /// Release held resources. Called exactly once when the request ends.
    fn dispose(&mut self) {}

    /// Canonical name of `action`, compared case-insensitively.
    fn find_action(&self, action: &str) -> Option<&'static str> {
        self.actions()
            .iter()
            .copied()
            .find(|a| a.eq_ignore_ascii_case(action))
    }
}
