//! Filter chain execution around one action.

use crate::controller::{ActionContext, ActionError, Controller};
use crate::filter::ScopedFilter;
use crate::result::ActionResult;

/// The ordered filters of a single invocation.
#[derive(Debug, Default)]
pub struct FilterChain {
    filters: Vec<ScopedFilter>,
}

impl FilterChain {
    /// Orders by scope; the sort is stable so declaration order holds within a scope.
    pub fn new(mut filters: Vec<ScopedFilter>) -> Self {
        filters.sort_by_key(|f| (f.scope, f.order));
        Self { filters }
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScopedFilter> {
        self.filters.iter()
    }

    /// Run before hooks outermost-first, the controller's own hooks and
    /// action innermost, then after hooks innermost-first.
    ///
    /// A failing action skips the after hooks; the error propagates.
    pub fn run(
        mut self,
        controller: &mut dyn Controller,
        ctx: &mut ActionContext,
    ) -> Result<ActionResult, ActionError> {
        for scoped in &mut self.filters {
            scoped.filter.on_action_executing(ctx);
        }
        controller.on_action_executing(ctx);

        let action = ctx.action_name().to_string();
        let mut result = controller.execute(&action, ctx)?;

        controller.on_action_executed(ctx, &mut result);
        for scoped in self.filters.iter_mut().rev() {
            tracing::trace!(filter = scoped.filter.name(), scope = ?scoped.scope, "Running after hook");
            scoped.filter.on_action_executed(ctx, &mut result);
        }
        Ok(result)
    }
}
