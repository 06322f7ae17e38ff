//! Read-only, serialisable projections of the model for debug logging.

use crate::application_model::{
    ActionId, ApiExplorerModel, ApplicationModel, ControllerId, ParameterId, SelectorModel,
};
use crate::attribute_route::AttributeRouteModel;
use crate::descriptor::ActionDescriptor;
use serde::Serialize;
use waymark_log::Level;

const TARGET: &str = "waymark::model";

#[derive(Debug, Serialize)]
pub struct AttributeRouteModelValues {
    pub template: Option<String>,
    pub order: Option<i32>,
    pub name: Option<String>,
}

impl From<&AttributeRouteModel> for AttributeRouteModelValues {
    fn from(route: &AttributeRouteModel) -> Self {
        Self {
            template: route.template.clone(),
            order: route.order,
            name: route.name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SelectorModelValues {
    pub attribute_route_model: Option<AttributeRouteModelValues>,
    pub action_constraints: Vec<String>,
    pub endpoint_metadata: Vec<String>,
}

impl From<&SelectorModel> for SelectorModelValues {
    fn from(selector: &SelectorModel) -> Self {
        Self {
            attribute_route_model: selector.attribute_route_model.as_ref().map(Into::into),
            action_constraints: selector.action_constraints.iter().map(|c| c.describe()).collect(),
            endpoint_metadata: selector
                .endpoint_metadata
                .iter()
                .map(|m| m.kind().to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ParameterModelValues {
    pub parameter_name: String,
    pub parameter_type: String,
    pub binding_source: Option<&'static str>,
    pub binder_model_name: Option<String>,
}

impl ParameterModelValues {
    pub fn new(app: &ApplicationModel, id: ParameterId) -> Self {
        let parameter = app.parameter(id);
        Self {
            parameter_name: parameter.parameter_name.clone(),
            parameter_type: parameter.ty.name.clone(),
            binding_source: parameter.binding_source().map(|s| s.as_str()),
            binder_model_name: parameter
                .binding_info
                .as_ref()
                .and_then(|b| b.binder_model_name.clone()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActionModelValues {
    pub action_name: String,
    pub method_name: String,
    pub controller_name: String,
    pub parameters: Vec<ParameterModelValues>,
    pub selectors: Vec<SelectorModelValues>,
    pub filters: Vec<String>,
    pub route_values: Vec<(String, String)>,
    pub api_explorer: ApiExplorerModel,
    pub properties: Vec<String>,
}

impl ActionModelValues {
    pub fn new(app: &ApplicationModel, id: ActionId) -> Self {
        let action = app.action(id);
        Self {
            action_name: action.action_name.clone(),
            method_name: action.method.name.clone(),
            controller_name: app.controller(action.controller).controller_name.clone(),
            parameters: action
                .parameters
                .iter()
                .map(|&p| ParameterModelValues::new(app, p))
                .collect(),
            selectors: action.selectors.iter().map(Into::into).collect(),
            filters: action.filters.iter().map(|f| f.name.clone()).collect(),
            route_values: action
                .route_values
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            api_explorer: action.api_explorer.clone(),
            properties: action.properties.iter().map(|(k, _)| k.to_string()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ControllerModelValues {
    pub controller_name: String,
    pub controller_type: String,
    pub part: String,
    pub actions: Vec<ActionModelValues>,
    pub selectors: Vec<SelectorModelValues>,
    pub filters: Vec<String>,
    pub api_explorer: ApiExplorerModel,
}

impl ControllerModelValues {
    pub fn new(app: &ApplicationModel, id: ControllerId) -> Self {
        let controller = app.controller(id);
        Self {
            controller_name: controller.controller_name.clone(),
            controller_type: controller.display_name(),
            part: controller.part.name.clone(),
            actions: controller
                .actions
                .iter()
                .map(|&a| ActionModelValues::new(app, a))
                .collect(),
            selectors: controller.selectors.iter().map(Into::into).collect(),
            filters: controller.filters.iter().map(|f| f.name.clone()).collect(),
            api_explorer: controller.api_explorer.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApplicationModelValues {
    pub controllers: Vec<ControllerModelValues>,
    pub filters: Vec<String>,
    pub api_explorer: ApiExplorerModel,
}

impl From<&ApplicationModel> for ApplicationModelValues {
    fn from(app: &ApplicationModel) -> Self {
        Self {
            controllers: app
                .controller_ids()
                .map(|c| ControllerModelValues::new(app, c))
                .collect(),
            filters: app.filters.iter().map(|f| f.name.clone()).collect(),
            api_explorer: app.api_explorer.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActionDescriptorValues {
    pub id: String,
    pub display_name: String,
    pub route_values: Vec<(String, Option<String>)>,
    pub attribute_route_template: Option<String>,
    pub filters: Vec<String>,
    pub parameters: Vec<String>,
    pub action_constraints: Vec<String>,
}

impl From<&ActionDescriptor> for ActionDescriptorValues {
    fn from(descriptor: &ActionDescriptor) -> Self {
        Self {
            id: descriptor.id.clone(),
            display_name: descriptor.display_name.clone(),
            route_values: descriptor
                .route_values
                .iter()
                .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
                .collect(),
            attribute_route_template: descriptor
                .attribute_route_info
                .as_ref()
                .map(|i| i.template.clone()),
            filters: descriptor
                .filter_descriptors
                .iter()
                .map(|f| f.filter.name.clone())
                .collect(),
            parameters: descriptor.parameters.iter().map(|p| p.name.clone()).collect(),
            action_constraints: descriptor
                .action_constraints
                .iter()
                .map(|c| c.describe())
                .collect(),
        }
    }
}

fn debug_enabled() -> bool {
    waymark_log::is_debug_enabled() || waymark_log::is_level_enabled(Level::Debug)
}

fn to_json<T: Serialize>(values: &T) -> Option<String> {
    match serde_json::to_string(values) {
        Ok(json) => Some(json),
        Err(e) => {
            waymark_log::warn!(target: TARGET, "Could not serialise model values: {}", e);
            None
        }
    }
}

pub fn log_application_model(app: &ApplicationModel) {
    if !debug_enabled() {
        return;
    }
    if let Some(json) = to_json(&ApplicationModelValues::from(app)) {
        waymark_log::event!(Level::Debug, TARGET, "Application model", "model" => json);
    }
}

pub fn log_action_descriptors(descriptors: &[ActionDescriptor]) {
    if !debug_enabled() {
        return;
    }
    let values: Vec<ActionDescriptorValues> = descriptors.iter().map(Into::into).collect();
    if let Some(json) = to_json(&values) {
        waymark_log::event!(Level::Debug, TARGET, "Action descriptors", "descriptors" => json);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_model::{ActionModel, ControllerModel};
    use crate::discovery::{ApplicationPart, ControllerType, MethodInfo};
    use std::sync::Arc;

    #[test]
    fn test_application_model_projection() {
        let mut app = ApplicationModel::new();
        let mut controller = ControllerModel::new(
            Arc::new(ControllerType::new("HomeController")),
            Arc::new(ApplicationPart::new("Web")),
        );
        controller
            .selectors
            .push(SelectorModel::with_route(AttributeRouteModel::new("home")));
        let c = app.add_controller(controller);
        app.add_action(ActionModel::new(c, Arc::new(MethodInfo::new("Index")), "Index".into()));

        let values = ApplicationModelValues::from(&app);
        let json = serde_json::to_value(&values).unwrap();
        assert_eq!(json["controllers"][0]["controller_name"], "Home");
        assert_eq!(json["controllers"][0]["actions"][0]["action_name"], "Index");
        assert_eq!(
            json["controllers"][0]["selectors"][0]["attribute_route_model"]["template"],
            "home"
        );
    }

    #[test]
    fn test_descriptor_projection() {
        let mut descriptor = ActionDescriptor::new("Home.Index");
        descriptor.route_values.try_insert("page", None);
        let values = ActionDescriptorValues::from(&descriptor);
        assert_eq!(values.route_values, vec![("page".to_string(), None)]);
        assert!(values.attribute_route_template.is_none());
    }
}
