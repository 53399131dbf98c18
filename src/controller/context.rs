//! Per-invocation action context.

use std::sync::Arc;

use axum::http::Method;

use crate::binding::{BindModel, BindingContext, ModelBinders, RequestData, SetCookie, ValueProviderCollection};
use crate::routing::RouteValues;
use crate::validation::{validate, ModelState, Validatable};

/// Everything an action and its filters can see about the current request.
///
/// Built fresh for each request and dropped with the response.
#[derive(Debug)]
pub struct ActionContext {
    controller: String,
    action: String,
    route_values: RouteValues,
    request: RequestData,
    value_providers: ValueProviderCollection,
    binders: Arc<ModelBinders>,
    model_state: ModelState,
    response_cookies: Vec<SetCookie>,
}

impl ActionContext {
    pub fn new(
        controller: &str,
        action: &str,
        route_values: RouteValues,
        request: RequestData,
        value_providers: ValueProviderCollection,
        binders: Arc<ModelBinders>,
    ) -> Self {
        Self {
            controller: controller.to_string(),
            action: action.to_string(),
            route_values,
            request,
            value_providers,
            binders,
            model_state: ModelState::default(),
            response_cookies: Vec::new(),
        }
    }

    pub fn controller_name(&self) -> &str {
        &self.controller
    }

    pub fn action_name(&self) -> &str {
        &self.action
    }

    pub fn method(&self) -> &Method {
        &self.request.method
    }

    pub fn route_values(&self) -> &RouteValues {
        &self.route_values
    }

    pub fn request(&self) -> &RequestData {
        &self.request
    }

    pub fn value_providers(&self) -> &ValueProviderCollection {
        &self.value_providers
    }

    pub fn model_state(&self) -> &ModelState {
        &self.model_state
    }

    pub fn model_state_mut(&mut self) -> &mut ModelState {
        &mut self.model_state
    }

    /// Simple parameter binding through the value providers.
    pub fn value(&self, key: &str) -> Option<String> {
        self.value_providers.string(key)
    }

    /// Bind a model, recording conversion errors in the model state.
    pub fn bind<M: BindModel>(&mut self) -> M {
        let binding = {
            let ctx = BindingContext::new(&self.request.form, &self.value_providers);
            self.binders.bind::<M>(&ctx)
        };
        self.model_state.extend(binding.errors);
        binding.model
    }

    /// Run every rule against `model`; returns whether the model state is valid.
    pub fn validate<M: Validatable>(&mut self, model: &M) -> bool {
        self.model_state.extend(validate(model));
        self.model_state.is_valid()
    }

    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.response_cookies.push(SetCookie::new(name, value));
    }

    pub fn response_cookies(&self) -> &[SetCookie] {
        &self.response_cookies
    }

    pub fn take_response_cookies(&mut self) -> Vec<SetCookie> {
        std::mem::take(&mut self.response_cookies)
    }

    #[cfg(test)]
    pub(crate) fn stub(controller: &str, action: &str) -> Self {
        Self::new(
            controller,
            action,
            RouteValues::default(),
            RequestData::new(Method::GET, "/"),
            ValueProviderCollection::default(),
            Arc::new(ModelBinders::new()),
        )
    }
}
