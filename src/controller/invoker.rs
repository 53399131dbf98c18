//! Action invocation strategies.

use std::fmt;
use std::time::Instant;

use crate::controller::{ActionContext, ActionError, Controller};
use crate::filter::FilterChain;
use crate::result::ActionResult;

/// Runs an action (and its filters) on a controller instance.
pub trait ActionInvoker: Send + Sync + fmt::Debug {
    fn invoke_action(
        &self,
        controller: &mut dyn Controller,
        ctx: &mut ActionContext,
        filters: FilterChain,
    ) -> Result<ActionResult, ActionError>;
}

/// Default invoker: the filter chain around the action.
#[derive(Debug, Default, Clone, Copy)]
pub struct ControllerActionInvoker;

impl ActionInvoker for ControllerActionInvoker {
    fn invoke_action(
        &self,
        controller: &mut dyn Controller,
        ctx: &mut ActionContext,
        filters: FilterChain,
    ) -> Result<ActionResult, ActionError> {
        filters.run(controller, ctx)
    }
}

/// Wraps the default invoker in a span and logs the outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingActionInvoker {
    inner: ControllerActionInvoker,
}

impl ActionInvoker for TracingActionInvoker {
    fn invoke_action(
        &self,
        controller: &mut dyn Controller,
        ctx: &mut ActionContext,
        filters: FilterChain,
    ) -> Result<ActionResult, ActionError> {
        let span = tracing::info_span!(
            "invoke_action",
            controller = %ctx.controller_name(),
            action = %ctx.action_name(),
            filters = filters.len()
        );
        let _guard = span.enter();

        let start = Instant::now();
        let outcome = self.inner.invoke_action(controller, ctx, filters);
        match &outcome {
            Ok(_) => tracing::info!(elapsed = ?start.elapsed(), "Action invoked"),
            Err(e) => tracing::warn!(elapsed = ?start.elapsed(), error = %e, "Action failed"),
        }
        outcome
    }
}
