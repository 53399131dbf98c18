//! Built-in filters.

use std::time::Instant;

use crate::controller::ActionContext;
use crate::filter::ActionFilter;
use crate::result::ActionResult;

/// Measures wall-clock time around the action and writes it (milliseconds)
/// into the view model's execution time field.
///
/// The start instant lives on the instance, so one instance must serve
/// one invocation at a time.
#[derive(Debug, Default)]
pub struct ExecutionTimeFilter {
    started: Option<Instant>,
    target: Option<(String, String)>,
}

impl ExecutionTimeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only write the field for this controller/action pair.
    pub fn for_action(controller: &str, action: &str) -> Self {
        Self {
            started: None,
            target: Some((controller.to_string(), action.to_string())),
        }
    }

    fn applies_to(&self, ctx: &ActionContext) -> bool {
        match &self.target {
            Some((controller, action)) => {
                controller.eq_ignore_ascii_case(ctx.controller_name())
                    && action.eq_ignore_ascii_case(ctx.action_name())
            }
            None => true,
        }
    }
}

impl ActionFilter for ExecutionTimeFilter {
    fn name(&self) -> &'static str {
        "execution_time"
    }

    fn on_action_executing(&mut self, _ctx: &ActionContext) {
        self.started = Some(Instant::now());
    }

    fn on_action_executed(&mut self, ctx: &ActionContext, result: &mut ActionResult) {
        let Some(started) = self.started.take() else {
            return;
        };
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        if !self.applies_to(ctx) {
            return;
        }
        if let Some(field) = result.view_model_mut().and_then(|m| m.execution_time_mut()) {
            *field = elapsed_ms;
        }
    }
}

/// Logs action boundaries.
#[derive(Debug, Default)]
pub struct ActionLogFilter {
    started: Option<Instant>,
}

impl ActionFilter for ActionLogFilter {
    fn name(&self) -> &'static str {
        "action_log"
    }

    fn on_action_executing(&mut self, ctx: &ActionContext) {
        self.started = Some(Instant::now());
        tracing::info!(
            controller = %ctx.controller_name(),
            action = %ctx.action_name(),
            "Action executing"
        );
    }

    fn on_action_executed(&mut self, ctx: &ActionContext, _result: &mut ActionResult) {
        let elapsed = self.started.take().map(|s| s.elapsed());
        tracing::info!(
            controller = %ctx.controller_name(),
            action = %ctx.action_name(),
            elapsed = ?elapsed,
            "Action executed"
        );
    }
}
