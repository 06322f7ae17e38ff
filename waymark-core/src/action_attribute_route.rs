//! Controller x action selector flattening.

use crate::application_model::{ActionModel, ControllerModel, SelectorModel};
use crate::attribute_route::AttributeRouteModel;
use crate::metadata::Metadata;

/// Final selectors for an action, one per (action selector, controller route).
///
/// Outer loop: action selectors. Inner loop: controller selectors that
/// carry a route. An absolute action route skips the controller routes.
/// Controller constraints and metadata that are not tied to a route still
/// apply when no controller route is used.
pub fn flatten_selectors(controller: &ControllerModel, action: &ActionModel) -> Vec<SelectorModel> {
    let controller_routes: Vec<&SelectorModel> = controller
        .selectors
        .iter()
        .filter(|s| s.is_attribute_routed())
        .collect();

    let additional = controller.selectors.first().map(unbound_selector);

    let mut flattened = Vec::new();
    for action_selector in &action.selectors {
        let action_route = action_selector.attribute_route_model.as_ref();

        if action_route.is_some_and(AttributeRouteModel::is_absolute_template) {
            flattened.push(merge(
                action_selector,
                AttributeRouteModel::combine(None, action_route),
                additional.as_ref(),
            ));
        } else if !controller_routes.is_empty() {
            for controller_selector in &controller_routes {
                flattened.push(merge(
                    action_selector,
                    AttributeRouteModel::combine(
                        controller_selector.attribute_route_model.as_ref(),
                        action_route,
                    ),
                    Some(controller_selector),
                ));
            }
        } else {
            flattened.push(merge(
                action_selector,
                AttributeRouteModel::combine(None, action_route),
                additional.as_ref(),
            ));
        }
    }

    flattened
}

/// Combined attribute routes of an action, used for route-parameter lookups.
pub fn attribute_routes(
    controller: &ControllerModel,
    action: &ActionModel,
) -> Vec<Option<AttributeRouteModel>> {
    let controller_routed = controller.has_attribute_routes();

    let mut routes = Vec::new();
    for action_selector in &action.selectors {
        let action_route = action_selector.attribute_route_model.as_ref();

        if action_route.is_some_and(AttributeRouteModel::is_absolute_template) || !controller_routed {
            routes.push(AttributeRouteModel::combine(None, action_route));
        } else {
            for controller_selector in &controller.selectors {
                routes.push(AttributeRouteModel::combine(
                    controller_selector.attribute_route_model.as_ref(),
                    action_route,
                ));
            }
        }
    }
    routes
}

/// Copy of the controller's first selector without anything route-specific.
fn unbound_selector(selector: &SelectorModel) -> SelectorModel {
    SelectorModel {
        attribute_route_model: None,
        // Constraints never carry route templates, so none need stripping.
        action_constraints: selector.action_constraints.clone(),
        endpoint_metadata: selector
            .endpoint_metadata
            .iter()
            .filter(|m| !m.is_route_template_provider())
            .cloned()
            .collect(),
    }
}

/// Controller metadata goes first so the action's own entries take
/// precedence for consumers reading the last match.
fn merge(
    action_selector: &SelectorModel,
    route: Option<AttributeRouteModel>,
    controller: Option<&SelectorModel>,
) -> SelectorModel {
    let mut selector = action_selector.clone();
    selector.attribute_route_model = route;

    if let Some(controller) = controller {
        selector
            .action_constraints
            .extend(controller.action_constraints.iter().cloned());

        let mut metadata: Vec<Metadata> = controller.endpoint_metadata.clone();
        metadata.append(&mut selector.endpoint_metadata);
        selector.endpoint_metadata = metadata;
    }

    selector
}
