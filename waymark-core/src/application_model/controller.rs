use super::parameter::PropertyModel;
use super::properties::PropertyBag;
use super::selector::SelectorModel;
use super::{ActionId, ApiExplorerModel, RouteValueList};
use crate::discovery::{ApplicationPart, ControllerType};
use crate::filters::FilterMetadata;
use crate::metadata::MetadataList;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct ControllerModel {
    pub controller_type: Arc<ControllerType>,
    pub part: Arc<ApplicationPart>,
    /// Type name without the `Controller` suffix.
    pub controller_name: String,
    pub metadata: MetadataList,
    pub filters: Vec<FilterMetadata>,
    pub selectors: Vec<SelectorModel>,
    pub route_values: RouteValueList,
    pub properties: PropertyBag,
    pub api_explorer: ApiExplorerModel,
    pub controller_properties: Vec<PropertyModel>,
    pub actions: Vec<ActionId>,
}

impl ControllerModel {
    pub fn new(controller_type: Arc<ControllerType>, part: Arc<ApplicationPart>) -> Self {
        let controller_name = controller_name(&controller_type.name).to_string();
        let metadata = controller_type.metadata.clone();
        Self {
            controller_type,
            part,
            controller_name,
            metadata,
            filters: Vec::new(),
            selectors: Vec::new(),
            route_values: RouteValueList::default(),
            properties: PropertyBag::new(),
            api_explorer: ApiExplorerModel::default(),
            controller_properties: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn display_name(&self) -> String {
        self.controller_type.full_name()
    }

    /// At least one selector defines an attribute route.
    pub fn has_attribute_routes(&self) -> bool {
        self.selectors.iter().any(SelectorModel::is_attribute_routed)
    }
}

/// `HomeController` -> `Home`. The suffix match ignores case.
pub fn controller_name(type_name: &str) -> &str {
    const SUFFIX: &str = "Controller";
    if crate::discovery::ends_with_ignore_case(type_name, SUFFIX) {
        &type_name[..type_name.len() - SUFFIX.len()]
    } else {
        type_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_name() {
        assert_eq!(controller_name("HomeController"), "Home");
        assert_eq!(controller_name("Homecontroller"), "Home");
        assert_eq!(controller_name("Widgets"), "Widgets");
        assert_eq!(controller_name("Controller"), "");
    }
}
