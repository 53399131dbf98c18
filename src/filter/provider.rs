//! Filter providers: filters contributed per (controller, action).

use std::collections::HashMap;

use crate::filter::{ActionFilter, FilterSpec};

/// Contributes filters for an action. Queried once per invocation.
pub trait FilterProvider: Send + Sync {
    fn filters(&self, controller: &str, action: &str) -> Vec<Box<dyn ActionFilter>>;
}

/// A fixed table keyed by controller and action name (case-insensitive).
#[derive(Debug, Default, Clone)]
pub struct ActionFilterProvider {
    entries: HashMap<(String, String), Vec<FilterSpec>>,
}

impl ActionFilterProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, controller: &str, action: &str, spec: FilterSpec) -> Self {
        self.entries
            .entry((controller.to_lowercase(), action.to_lowercase()))
            .or_default()
            .push(spec);
        self
    }
}

impl FilterProvider for ActionFilterProvider {
    fn filters(&self, controller: &str, action: &str) -> Vec<Box<dyn ActionFilter>> {
        self.entries
            .get(&(controller.to_lowercase(), action.to_lowercase()))
            .map(|specs| specs.iter().map(FilterSpec::instantiate).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_matches_controller_and_action() {
        let provider = ActionFilterProvider::new()
            .with("TestFilter", "FilterByFilterProvider", FilterSpec::ExecutionTime);
        assert_eq!(provider.filters("TestFilter", "FilterByFilterProvider").len(), 1);
        assert_eq!(provider.filters("testfilter", "filterbyfilterprovider").len(), 1);
        assert!(provider.filters("TestFilter", "Index").is_empty());
        assert!(provider.filters("Home", "FilterByFilterProvider").is_empty());
    }
}
