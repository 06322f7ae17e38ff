//! Link-time controller registration using inventory
//!
//! Crates declare their controllers with [`register_controller!`] and the
//! host collects them with [`ApplicationPartManager::from_registry`].

use crate::discovery::{ApplicationPart, ApplicationPartManager, ControllerType};
use std::collections::BTreeMap;

/// A controller shape submitted via inventory
pub struct ControllerEntry {
    /// Application part the controller belongs to
    pub part: &'static str,
    /// Builds the controller description on demand
    pub describe: fn() -> ControllerType,
}

inventory::collect!(ControllerEntry);

impl ControllerEntry {
    pub const fn new(part: &'static str, describe: fn() -> ControllerType) -> Self {
        Self { part, describe }
    }
}

/// All registered controller entries.
pub fn registered_controllers() -> impl Iterator<Item = &'static ControllerEntry> {
    inventory::iter::<ControllerEntry>.into_iter()
}

/// Group registered controllers into parts, keyed by part name.
pub fn registered_parts() -> Vec<ApplicationPart> {
    let mut parts: BTreeMap<&'static str, ApplicationPart> = BTreeMap::new();
    for entry in registered_controllers() {
        let part = parts
            .entry(entry.part)
            .or_insert_with(|| ApplicationPart::new(entry.part));
        part.types.push(std::sync::Arc::new((entry.describe)()));
    }
    parts.into_values().collect()
}

impl ApplicationPartManager {
    /// Manager populated from every [`register_controller!`] invocation.
    pub fn from_registry() -> Self {
        let parts = registered_parts();
        waymark_log::debug!("Collected {} application parts from registry", parts.len());
        Self::with_parts(parts)
    }
}

/// Register a controller description with the inventory
///
/// ```rust,ignore
/// fn home() -> ControllerType {
///     ControllerType::new("HomeController")
/// }
///
/// register_controller!("Shop.Web", home);
/// ```
#[macro_export]
macro_rules! register_controller {
    ($part:expr, $describe:path) => {
        $crate::inventory::submit! {
            $crate::controller_registry::ControllerEntry::new($part, $describe)
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Metadata;

    fn registered_home() -> ControllerType {
        ControllerType::new("RegisteredHomeController").with_metadata(vec![Metadata::route("home")])
    }

    crate::register_controller!("RegistryTests", registered_home);

    #[test]
    fn test_registered_controller_is_collected() {
        let parts = registered_parts();
        let part = parts.iter().find(|p| p.name == "RegistryTests").unwrap();
        assert!(part.types.iter().any(|t| t.name == "RegisteredHomeController"));
    }

    #[test]
    fn test_manager_from_registry() {
        let manager = ApplicationPartManager::from_registry();
        assert!(
            manager
                .controllers()
                .iter()
                .any(|c| c.ty.name == "RegisteredHomeController")
        );
    }
}
