//! Controller resolution.
//!
//! # Responsibilities
//! - Map a route's controller token to a registered controller type
//! - Support two lookup policies: fixed namespace, or convention scan
//! - Optionally replace the action invoker of named controllers (scan policy)
//! - Hand out a lease whose drop releases the controller
//!
//! # Design Decisions
//! - The registry is built once at startup and read-only afterwards
//! - Type names follow the `<Token>Controller` convention
//! - An unknown token is `ResolveError::NotFound`, answered as 404

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::controller::invoker::{ActionInvoker, ControllerActionInvoker};
use crate::controller::{ActionContext, ActionError, Controller};
use crate::filter::FilterChain;
use crate::result::ActionResult;

const CONTROLLER_SUFFIX: &str = "Controller";

pub type ControllerConstructor = fn() -> Box<dyn Controller>;

/// Registration of one controller type.
#[derive(Clone, Copy)]
pub struct ControllerDescriptor {
    pub namespace: &'static str,
    pub type_name: &'static str,
    pub construct: ControllerConstructor,
}

impl fmt::Debug for ControllerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerDescriptor")
            .field("namespace", &self.namespace)
            .field("type_name", &self.type_name)
            .finish()
    }
}

impl ControllerDescriptor {
    pub const fn new(namespace: &'static str, type_name: &'static str, construct: ControllerConstructor) -> Self {
        Self {
            namespace,
            type_name,
            construct,
        }
    }

    /// Descriptor for a controller built through its `Default` impl.
    pub fn of<C: Controller + Default + 'static>(namespace: &'static str, type_name: &'static str) -> Self {
        Self::new(namespace, type_name, construct_default::<C>)
    }

    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.namespace, self.type_name)
    }

    fn follows_convention(&self) -> bool {
        self.type_name.len() > CONTROLLER_SUFFIX.len() && self.type_name.ends_with(CONTROLLER_SUFFIX)
    }
}

fn construct_default<C: Controller + Default + 'static>() -> Box<dyn Controller> {
    Box::new(C::default())
}

/// How a token is turned into a controller type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionPolicy {
    /// Look up `<namespace>::<Token>Controller` directly.
    Namespace(String),
    /// Scan every registered type following the naming convention.
    ConventionScan,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no controller found for '{0}'")]
    NotFound(String),
}

/// A resolved controller for the duration of one request.
///
/// Dropping the lease disposes the controller.
pub struct ControllerLease {
    name: String,
    controller: Box<dyn Controller>,
    invoker: Arc<dyn ActionInvoker>,
}

impl fmt::Debug for ControllerLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerLease")
            .field("name", &self.name)
            .field("invoker", &self.invoker)
            .finish()
    }
}

impl ControllerLease {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn controller(&self) -> &dyn Controller {
        self.controller.as_ref()
    }

    pub fn invoker(&self) -> &Arc<dyn ActionInvoker> {
        &self.invoker
    }

    pub fn set_invoker(&mut self, invoker: Arc<dyn ActionInvoker>) {
        self.invoker = invoker;
    }

    /// Run an action through this controller's invoker.
    pub fn invoke(&mut self, ctx: &mut ActionContext, filters: FilterChain) -> Result<ActionResult, ActionError> {
        let invoker = self.invoker.clone();
        invoker.invoke_action(self.controller.as_mut(), ctx, filters)
    }
}

impl Drop for ControllerLease {
    fn drop(&mut self) {
        self.controller.dispose();
        tracing::debug!(controller = %self.name, "Controller released");
    }
}

/// Creates and releases controllers.
pub struct ControllerFactory {
    policy: ResolutionPolicy,
    descriptors: Vec<ControllerDescriptor>,
    by_qualified_name: HashMap<String, usize>,
    default_invoker: Arc<dyn ActionInvoker>,
    invoker_overrides: HashMap<String, Arc<dyn ActionInvoker>>,
}

impl fmt::Debug for ControllerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut overrides: Vec<_> = self.invoker_overrides.keys().collect();
        overrides.sort();
        f.debug_struct("ControllerFactory")
            .field("policy", &self.policy)
            .field("descriptors", &self.descriptors)
            .field("invoker_overrides", &overrides)
            .finish()
    }
}

impl ControllerFactory {
    pub fn new(policy: ResolutionPolicy) -> Self {
        Self {
            policy,
            descriptors: Vec::new(),
            by_qualified_name: HashMap::new(),
            default_invoker: Arc::new(ControllerActionInvoker),
            invoker_overrides: HashMap::new(),
        }
    }

    pub fn policy(&self) -> &ResolutionPolicy {
        &self.policy
    }

    pub fn register(&mut self, descriptor: ControllerDescriptor) {
        self.by_qualified_name
            .insert(descriptor.qualified_name().to_lowercase(), self.descriptors.len());
        self.descriptors.push(descriptor);
    }

    /// Replace the invoker of the controller named `token` after construction.
    ///
    /// Applies under the convention scan policy only.
    pub fn override_invoker(&mut self, token: &str, invoker: Arc<dyn ActionInvoker>) {
        self.invoker_overrides.insert(token.to_lowercase(), invoker);
    }

    pub fn descriptors(&self) -> &[ControllerDescriptor] {
        &self.descriptors
    }

    fn find(&self, token: &str) -> Option<&ControllerDescriptor> {
        if token.is_empty() {
            return None;
        }
        let type_name = format!("{}{}", token, CONTROLLER_SUFFIX);
        match &self.policy {
            ResolutionPolicy::Namespace(namespace) => {
                let key = format!("{}::{}", namespace, type_name).to_lowercase();
                self.by_qualified_name.get(&key).map(|&i| &self.descriptors[i])
            }
            ResolutionPolicy::ConventionScan => self
                .descriptors
                .iter()
                .filter(|d| d.follows_convention())
                .find(|d| d.type_name.eq_ignore_ascii_case(&type_name)),
        }
    }

    /// Instantiate the controller for a route token.
    pub fn create(&self, token: &str) -> Result<ControllerLease, ResolveError> {
        let descriptor = self
            .find(token)
            .ok_or_else(|| ResolveError::NotFound(token.to_string()))?;

        let mut lease = ControllerLease {
            name: descriptor
                .type_name
                .strip_suffix(CONTROLLER_SUFFIX)
                .unwrap_or(descriptor.type_name)
                .to_string(),
            controller: (descriptor.construct)(),
            invoker: self.default_invoker.clone(),
        };

        if self.policy == ResolutionPolicy::ConventionScan {
            if let Some(invoker) = self.invoker_overrides.get(&token.to_lowercase()) {
                tracing::debug!(controller = %lease.name, invoker = ?invoker, "Replacing action invoker");
                lease.set_invoker(invoker.clone());
            }
        }

        tracing::debug!(
            controller = %lease.name,
            type_name = %descriptor.qualified_name(),
            "Controller resolved"
        );
        Ok(lease)
    }

    /// Release hook: the lease's drop disposes the controller.
    pub fn release(&self, lease: ControllerLease) {
        drop(lease);
    }
}
