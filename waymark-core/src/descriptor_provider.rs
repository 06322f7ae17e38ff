//! Action descriptor providers and route-key normalisation.

use crate::descriptor::ActionDescriptor;
use crate::descriptor_builder;
use crate::discovery::ApplicationPartManager;
use crate::error::Result;
use crate::model_factory::ApplicationModelFactory;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct ActionDescriptorProviderContext {
    pub results: Vec<ActionDescriptor>,
}

/// Contributes descriptors to the shared result set.
///
/// `on_providers_executing` runs in ascending `order`,
/// `on_providers_executed` in descending `order` after every provider has
/// contributed.
pub trait ActionDescriptorProvider: Send + Sync {
    fn order(&self) -> i32;

    fn on_providers_executing(&self, context: &mut ActionDescriptorProviderContext) -> Result<()>;

    fn on_providers_executed(&self, _context: &mut ActionDescriptorProviderContext) -> Result<()> {
        Ok(())
    }
}

/// Descriptors for the controllers found in the application parts.
pub struct ControllerActionDescriptorProvider {
    parts: Arc<ApplicationPartManager>,
    factory: ApplicationModelFactory,
}

impl ControllerActionDescriptorProvider {
    pub const ORDER: i32 = -1000;

    pub fn new(parts: Arc<ApplicationPartManager>, factory: ApplicationModelFactory) -> Self {
        Self { parts, factory }
    }
}

impl ActionDescriptorProvider for ControllerActionDescriptorProvider {
    fn order(&self) -> i32 {
        Self::ORDER
    }

    fn on_providers_executing(&self, context: &mut ActionDescriptorProviderContext) -> Result<()> {
        let model = self.factory.create_application_model(self.parts.controllers())?;
        let descriptors = descriptor_builder::build(&model)?;
        waymark_log::debug!("Controller provider contributed {} descriptors", descriptors.len());
        context.results.extend(descriptors);
        Ok(())
    }

    fn on_providers_executed(&self, context: &mut ActionDescriptorProviderContext) -> Result<()> {
        normalize_route_keys(&mut context.results);
        Ok(())
    }
}

/// Give every descriptor the same route keys, adding missing ones as null.
///
/// Keys are gathered without regard to case; the first spelling seen is
/// the one inserted.
pub fn normalize_route_keys(descriptors: &mut [ActionDescriptor]) {
    let mut keys: BTreeMap<String, String> = BTreeMap::new();
    for descriptor in descriptors.iter() {
        for key in descriptor.route_values.keys() {
            keys.entry(key.to_ascii_lowercase()).or_insert_with(|| key.to_string());
        }
    }

    for descriptor in descriptors.iter_mut() {
        for key in keys.values() {
            descriptor.route_values.try_insert(key.as_str(), None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::RouteValues;

    fn descriptor(keys: &[(&str, &str)]) -> ActionDescriptor {
        let mut d = ActionDescriptor::new("d");
        d.route_values = keys.iter().map(|(k, v)| (*k, Some(v.to_string()))).collect::<RouteValues>();
        d
    }

    #[test]
    fn test_normalize_route_keys() {
        let mut descriptors = vec![
            descriptor(&[("action", "Index"), ("controller", "Home")]),
            descriptor(&[("page", "/Index")]),
        ];
        normalize_route_keys(&mut descriptors);

        for d in &descriptors {
            assert_eq!(d.route_values.len(), 3);
        }
        assert!(descriptors[0].route_values.contains_key("page"));
        assert_eq!(descriptors[0].route_values.get("page"), None);
        assert_eq!(descriptors[1].route_values.get("action"), None);
        assert_eq!(descriptors[1].route_values.get("page"), Some("/Index"));
    }

    #[test]
    fn test_normalize_ignores_key_case() {
        let mut descriptors = vec![descriptor(&[("Area", "Admin")]), descriptor(&[("area", "Shop")])];
        normalize_route_keys(&mut descriptors);
        assert_eq!(descriptors[0].route_values.len(), 1);
        assert_eq!(descriptors[1].route_values.get("AREA"), Some("Shop"));
    }
}
