use super::properties::PropertyBag;
use super::selector::SelectorModel;
use super::{ApiExplorerModel, ControllerId, ParameterId, RouteValueList};
use crate::attribute_route::SharedTransformer;
use crate::discovery::MethodInfo;
use crate::filters::FilterMetadata;
use crate::metadata::MetadataList;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct ActionModel {
    pub controller: ControllerId,
    pub method: Arc<MethodInfo>,
    pub action_name: String,
    pub metadata: MetadataList,
    pub filters: Vec<FilterMetadata>,
    pub selectors: Vec<SelectorModel>,
    pub parameters: Vec<ParameterId>,
    pub route_values: RouteValueList,
    pub properties: PropertyBag,
    pub api_explorer: ApiExplorerModel,
    /// Applied to route values during `[token]` replacement.
    pub route_parameter_transformer: Option<SharedTransformer>,
}

impl ActionModel {
    pub fn new(controller: ControllerId, method: Arc<MethodInfo>, action_name: String) -> Self {
        let metadata = method.metadata.clone();
        Self {
            controller,
            method,
            action_name,
            metadata,
            filters: Vec::new(),
            selectors: Vec::new(),
            parameters: Vec::new(),
            route_values: RouteValueList::default(),
            properties: PropertyBag::new(),
            api_explorer: ApiExplorerModel::default(),
            route_parameter_transformer: None,
        }
    }

    pub fn has_attribute_routes(&self) -> bool {
        self.selectors.iter().any(SelectorModel::is_attribute_routed)
    }
}

/// Action name derived from a method name.
pub fn action_name_from_method(method_name: &str, suppress_async_suffix: bool) -> &str {
    const SUFFIX: &str = "Async";
    match method_name.strip_suffix(SUFFIX) {
        Some(stripped) if suppress_async_suffix => stripped,
        _ => method_name,
    }
}
