//! Controllers of the demo application.
//!
//! Each controller exercises one extension point; see `app::routes` for
//! the URLs that reach them.

use std::time::Instant;

use axum::http::Method;

use crate::app::models::{DateModel, FilterModel, ResultModel, ValidationModel};
use crate::controller::{ActionContext, ActionError, Controller};
use crate::result::{ActionResult, ViewResult, XmlResult};

fn unknown(controller: &str, action: &str) -> ActionError {
    ActionError::UnknownAction {
        controller: controller.to_string(),
        action: action.to_string(),
    }
}

/// Landing page.
#[derive(Debug, Default)]
pub struct HomeController;

impl Controller for HomeController {
    fn actions(&self) -> &'static [&'static str] {
        &["Index"]
    }

    fn execute(&mut self, action: &str, _ctx: &mut ActionContext) -> Result<ActionResult, ActionError> {
        match action {
            "Index" => Ok(ActionResult::empty_view("Index")),
            other => Err(unknown("Home", other)),
        }
    }
}

/// Reached only through routes whose constraints accepted the `user` segment.
#[derive(Debug, Default)]
pub struct TestRouteConstraintController;

impl TestRouteConstraintController {
    fn result(message: &str, ctx: &ActionContext) -> ActionResult {
        let mut view = ViewResult::new("Result", None).with_data("Message", message);
        if let Some(user) = ctx.route_values().get("user") {
            view = view.with_data("User", user);
        }
        ActionResult::View(view)
    }
}

impl Controller for TestRouteConstraintController {
    fn actions(&self) -> &'static [&'static str] {
        &["Index", "RegularExpressionConstraint", "CustomRouteConstraint", "Match"]
    }

    fn execute(&mut self, action: &str, ctx: &mut ActionContext) -> Result<ActionResult, ActionError> {
        match action {
            "Index" => Ok(ActionResult::view("Index", ResultModel::default())),
            "RegularExpressionConstraint" => Ok(Self::result("Regular Expression Constraint success", ctx)),
            "CustomRouteConstraint" => Ok(Self::result("Custom Route Constraint success", ctx)),
            "Match" => Ok(Self::result("User Route Constraint success", ctx)),
            other => Err(unknown("TestRouteConstraint", other)),
        }
    }
}

/// GET shows an empty date form; POST binds `Day`/`Month`/`Year` into one date.
#[derive(Debug, Default)]
pub struct TestModelBindingController;

impl Controller for TestModelBindingController {
    fn actions(&self) -> &'static [&'static str] {
        &["Index", "TestModelBinding"]
    }

    fn execute(&mut self, action: &str, ctx: &mut ActionContext) -> Result<ActionResult, ActionError> {
        match action {
            "Index" => Ok(ActionResult::view("Index", DateModel::default())),
            "TestModelBinding" => {
                let model: DateModel = ctx.bind();
                Ok(ActionResult::view("Index", model))
            }
            other => Err(unknown("TestModelBinding", other)),
        }
    }
}

/// Server-side validation. The posted model is always re-validated here,
/// whatever a client-side check decided.
#[derive(Debug, Default)]
pub struct TestValidationController;

impl TestValidationController {
    fn index(model: ValidationModel, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        let errors = serde_json::to_value(ctx.model_state().errors())?;
        let client_rules = serde_json::to_value(ValidationModel::client_rules())?;
        let view = ViewResult::new("Index", Some(Box::new(model)))
            .with_data("Errors", errors)
            .with_data("ClientRules", client_rules);
        Ok(ActionResult::View(view))
    }
}

impl Controller for TestValidationController {
    fn actions(&self) -> &'static [&'static str] {
        &["Index", "Validate"]
    }

    fn execute(&mut self, action: &str, ctx: &mut ActionContext) -> Result<ActionResult, ActionError> {
        match action {
            "Index" => Self::index(ValidationModel::default(), ctx),
            "Validate" => {
                let mut model: ValidationModel = ctx.bind();
                let message = if ctx.validate(&model) {
                    "Server side: Model is valid"
                } else {
                    tracing::debug!(errors = ctx.model_state().errors().len(), "Model is not valid");
                    "Server side: Model is not valid"
                };
                model.message = Some(message.to_string());
                Self::index(model, ctx)
            }
            other => Err(unknown("TestValidation", other)),
        }
    }
}

/// GET hands out an `id` cookie; POST reads `id` back through the value providers.
#[derive(Debug, Default)]
pub struct TestValueProviderController;

impl Controller for TestValueProviderController {
    fn actions(&self) -> &'static [&'static str] {
        &["Index"]
    }

    fn execute(&mut self, action: &str, ctx: &mut ActionContext) -> Result<ActionResult, ActionError> {
        if action != "Index" {
            return Err(unknown("TestValueProvider", action));
        }
        if *ctx.method() == Method::POST {
            let mut model: ResultModel = ctx.bind();
            model.id = ctx.value("id");
            Ok(ActionResult::view("Index", model))
        } else {
            ctx.set_cookie("id", "3");
            Ok(ActionResult::view("Index", ResultModel::default()))
        }
    }
}

/// POST answers with the model serialized as XML.
#[derive(Debug, Default)]
pub struct TestActionResultController;

impl Controller for TestActionResultController {
    fn actions(&self) -> &'static [&'static str] {
        &["Index", "TestActionResult"]
    }

    fn execute(&mut self, action: &str, ctx: &mut ActionContext) -> Result<ActionResult, ActionError> {
        match action {
            "Index" => Ok(ActionResult::empty_view("Index")),
            "TestActionResult" => {
                let model = ResultModel {
                    id: None,
                    message: ctx.value("message"),
                };
                Ok(ActionResult::Content(XmlResult::from_model(&model)))
            }
            other => Err(unknown("TestActionResult", other)),
        }
    }
}

/// One action per filter registration style. `FilterByOverrideMethod` is
/// timed by the controller's own hooks.
#[derive(Debug, Default)]
pub struct TestFilterController {
    started: Option<Instant>,
}

const OVERRIDE_TIMED: &str = "FilterByOverrideMethod";

impl Controller for TestFilterController {
    fn actions(&self) -> &'static [&'static str] {
        &[
            "Index",
            "FilterByOverrideMethod",
            "FilterByCustomActionFilterAttribute",
            "FilterByFilterProvider",
            "FilterByGlobalFilter",
        ]
    }

    fn execute(&mut self, action: &str, _ctx: &mut ActionContext) -> Result<ActionResult, ActionError> {
        match self.find_action(action) {
            Some(name) => Ok(ActionResult::view("Index", FilterModel::new(name))),
            None => Err(unknown("TestFilter", action)),
        }
    }

    fn on_action_executing(&mut self, ctx: &ActionContext) {
        if ctx.action_name() == OVERRIDE_TIMED {
            self.started = Some(Instant::now());
        }
    }

    fn on_action_executed(&mut self, ctx: &ActionContext, result: &mut ActionResult) {
        if ctx.action_name() != OVERRIDE_TIMED {
            return;
        }
        let Some(started) = self.started.take() else {
            return;
        };
        if let Some(field) = result.view_model_mut().and_then(|m| m.execution_time_mut()) {
            *field = started.elapsed().as_secs_f64() * 1000.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterChain;

    fn execution_time(result: &mut ActionResult) -> Option<f64> {
        result.view_model_mut().and_then(|m| m.execution_time_mut()).copied()
    }

    #[test]
    fn test_override_hooks_time_only_their_action() {
        let mut controller = TestFilterController::default();

        let mut ctx = ActionContext::stub("TestFilter", "FilterByOverrideMethod");
        controller.on_action_executing(&ctx);
        std::thread::sleep(std::time::Duration::from_millis(2));
        let mut result = controller.execute("FilterByOverrideMethod", &mut ctx).unwrap();
        controller.on_action_executed(&ctx, &mut result);
        assert!(execution_time(&mut result).unwrap() >= 2.0);

        let mut ctx = ActionContext::stub("TestFilter", "Index");
        let mut result = FilterChain::default().run(&mut controller, &mut ctx).unwrap();
        assert_eq!(execution_time(&mut result), Some(0.0));
    }

    #[test]
    fn test_get_sets_id_cookie() {
        let mut controller = TestValueProviderController;
        let mut ctx = ActionContext::stub("TestValueProvider", "Index");
        controller.execute("Index", &mut ctx).unwrap();
        let cookies = ctx.take_response_cookies();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].to_header_value(), "id=3; Path=/");
    }

    #[test]
    fn test_unknown_action_is_an_error() {
        let mut ctx = ActionContext::stub("Home", "Nope");
        assert!(matches!(
            HomeController.execute("Nope", &mut ctx),
            Err(ActionError::UnknownAction { .. })
        ));
    }
}
