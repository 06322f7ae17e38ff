//! Turns a finished application model into action descriptors.
//!
//! One descriptor is produced per flattened selector. Attribute route
//! templates and names have their `[tokens]` replaced here, and every
//! routing problem found along the way is collected so the caller sees
//! them all at once.

use crate::action_attribute_route::flatten_selectors;
use crate::application_model::{
    ActionId, ActionModel, ApiExplorerModel, ApplicationModel, ControllerModel, PropertyBag,
    SelectorModel,
};
use crate::attribute_route::{AttributeRouteInfo, AttributeRouteModel, TokenValues};
use crate::descriptor::{ActionDescriptor, ParameterDescriptor, RouteValues};
use crate::error::{Error, Result};
use crate::filters::{FilterDescriptor, FilterScope, sort_filter_descriptors};
use std::collections::BTreeMap;

pub const ACTION_KEY: &str = "action";
pub const CONTROLLER_KEY: &str = "controller";

/// Build descriptors for every action in `app`.
pub fn build(app: &ApplicationModel) -> Result<Vec<ActionDescriptor>> {
    let mut descriptors = Vec::new();
    let mut errors = Vec::new();

    for action in app.action_ids() {
        let model = app.action(action);
        let controller = app.controller(model.controller);
        let display_name = app.action_display_name(action);
        let selectors = flatten_selectors(controller, model);

        if let Some(message) = mixed_routing_error(&display_name, model, &selectors) {
            errors.push(message);
        }

        for selector in &selectors {
            let mut descriptor = create_descriptor(app, action, selector);

            if let Some(route) = &selector.attribute_route_model {
                match attribute_route_info(&descriptor, controller, model, route) {
                    Ok(info) => descriptor.attribute_route_info = Some(info),
                    Err(e) => errors.push(format!("For action: '{display_name}'\nError: {e}")),
                }
            }

            apply_api_explorer(app, controller, model, &mut descriptor)?;
            descriptors.push(descriptor);
        }
    }

    errors.extend(duplicate_route_name_errors(&descriptors));

    if !errors.is_empty() {
        waymark_log::error!("Attribute routing produced {} errors", errors.len());
        return Err(Error::AttributeRouting(errors));
    }

    waymark_log::debug!("Built {} action descriptors", descriptors.len());
    Ok(descriptors)
}

fn create_descriptor(app: &ApplicationModel, action: ActionId, selector: &SelectorModel) -> ActionDescriptor {
    let model = app.action(action);
    let controller = app.controller(model.controller);

    let mut descriptor = ActionDescriptor::new(app.action_display_name(action));
    descriptor.controller_name = controller.controller_name.clone();
    descriptor.action_name = model.action_name.clone();
    descriptor.method_name = model.method.name.clone();
    descriptor.controller_type_name = controller.display_name();

    descriptor.parameters = app
        .parameters_of(action)
        .map(|p| ParameterDescriptor {
            name: p.parameter_name.clone(),
            parameter_type: p.ty.clone(),
            binding_info: p.binding_info.clone(),
        })
        .collect();
    descriptor.bound_properties = controller
        .controller_properties
        .iter()
        .map(|p| ParameterDescriptor {
            name: p.property_name.clone(),
            parameter_type: p.ty.clone(),
            binding_info: p.binding_info.clone(),
        })
        .collect();

    descriptor.action_constraints = selector.action_constraints.clone();
    descriptor.endpoint_metadata = selector.endpoint_metadata.clone();
    descriptor.route_values = route_values(controller, model);
    descriptor.filter_descriptors = filter_descriptors(app, controller, model);
    descriptor.properties = properties(app, controller, model);

    descriptor
}

/// Action values, then controller values, then the `action` and
/// `controller` defaults. The first value for a key wins.
fn route_values(controller: &ControllerModel, action: &ActionModel) -> RouteValues {
    let mut values = RouteValues::new();
    for (key, value) in action.route_values.iter() {
        values.try_insert(key, Some(value.to_string()));
    }
    for (key, value) in controller.route_values.iter() {
        values.try_insert(key, Some(value.to_string()));
    }
    values.try_insert(ACTION_KEY, Some(action.action_name.clone()));
    values.try_insert(CONTROLLER_KEY, Some(controller.controller_name.clone()));
    values
}

fn filter_descriptors(
    app: &ApplicationModel,
    controller: &ControllerModel,
    action: &ActionModel,
) -> Vec<FilterDescriptor> {
    let mut filters: Vec<FilterDescriptor> = action
        .filters
        .iter()
        .map(|f| FilterDescriptor::new(f.clone(), FilterScope::Action))
        .chain(
            controller
                .filters
                .iter()
                .map(|f| FilterDescriptor::new(f.clone(), FilterScope::Controller)),
        )
        .chain(
            app.filters
                .iter()
                .map(|f| FilterDescriptor::new(f.clone(), FilterScope::Global)),
        )
        .collect();
    sort_filter_descriptors(&mut filters);
    filters
}

fn properties(app: &ApplicationModel, controller: &ControllerModel, action: &ActionModel) -> PropertyBag {
    let mut bag = app.properties.clone();
    bag.merge_from(&controller.properties);
    bag.merge_from(&action.properties);
    bag
}

fn token_values(controller: &ControllerModel, action: &ActionModel) -> TokenValues {
    let mut values = TokenValues::new();
    values.insert(ACTION_KEY, action.action_name.as_str());
    values.insert(CONTROLLER_KEY, controller.controller_name.as_str());
    for (key, value) in action.route_values.iter() {
        values.insert(key, value);
    }
    for (key, value) in controller.route_values.iter() {
        values.insert(key, value);
    }
    values
}

fn attribute_route_info(
    descriptor: &ActionDescriptor,
    controller: &ControllerModel,
    action: &ActionModel,
    route: &AttributeRouteModel,
) -> Result<AttributeRouteInfo> {
    let values = token_values(controller, action);
    let transformer = action.route_parameter_transformer.as_deref();

    let raw = route.template.as_deref().unwrap_or_default();
    let template = AttributeRouteModel::replace_tokens(raw, &values, transformer)?;
    if template == "//" {
        return Err(Error::InvalidCombinedTemplate {
            action: descriptor.display_name.clone(),
            template,
        });
    }

    let name = route
        .name
        .as_deref()
        .map(|name| AttributeRouteModel::replace_tokens(name, &values, transformer))
        .transpose()?;

    Ok(AttributeRouteInfo {
        template,
        order: route.order.unwrap_or(0),
        name,
        suppress_link_generation: route.suppress_link_generation,
        suppress_path_matching: route.suppress_path_matching,
    })
}

fn mixed_routing_error(display_name: &str, action: &ActionModel, selectors: &[SelectorModel]) -> Option<String> {
    let routed = selectors.iter().filter(|s| s.is_attribute_routed()).count();
    if routed == 0 || routed == selectors.len() {
        return None;
    }

    let lines: Vec<String> = selectors
        .iter()
        .map(|s| {
            let route = match &s.attribute_route_model {
                Some(r) => format!("Attribute route: '{}'", r.template.as_deref().unwrap_or_default()),
                None => "Conventional route".to_string(),
            };
            let methods = s.http_methods();
            let methods = if methods.is_empty() {
                String::new()
            } else {
                format!(" - HTTP methods: '{}'", methods.join(", "))
            };
            format!("Action: '{display_name}' - {route}{methods}")
        })
        .collect();

    Some(format!(
        "A method '{}' must not define attribute routed actions and non attribute routed actions at the same time:\n{}",
        action.method.name,
        lines.join("\n")
    ))
}

/// Routes sharing a name (ignoring case) must share a template.
fn duplicate_route_name_errors(descriptors: &[ActionDescriptor]) -> Vec<String> {
    let mut by_name: BTreeMap<String, Vec<&ActionDescriptor>> = BTreeMap::new();
    for descriptor in descriptors {
        if let Some(name) = descriptor.attribute_route_info.as_ref().and_then(|i| i.name.as_deref()) {
            by_name.entry(name.to_ascii_lowercase()).or_default().push(descriptor);
        }
    }

    let mut errors = Vec::new();
    for group in by_name.values() {
        let template = |d: &ActionDescriptor| {
            d.attribute_route_info
                .as_ref()
                .map(|i| i.template.to_ascii_lowercase())
                .unwrap_or_default()
        };
        let first = template(group[0]);
        if group.iter().all(|d| template(d) == first) {
            continue;
        }

        let name = group[0]
            .attribute_route_info
            .as_ref()
            .and_then(|i| i.name.clone())
            .unwrap_or_default();
        let lines: Vec<String> = group
            .iter()
            .map(|d| {
                let template = d.attribute_route_info.as_ref().map(|i| i.template.as_str()).unwrap_or_default();
                format!("Action: '{}' - Template: '{}'", d.display_name, template)
            })
            .collect();
        errors.push(format!(
            "Attribute routes with the same name '{}' must have the same template:\n{}",
            name,
            lines.join("\n")
        ));
    }
    errors
}

/// Visibility set on the action or controller requires an attribute
/// route. Application-level visibility only applies to routed actions.
fn apply_api_explorer(
    app: &ApplicationModel,
    controller: &ControllerModel,
    action: &ActionModel,
    descriptor: &mut ActionDescriptor,
) -> Result<()> {
    let set_on_action_or_controller = action
        .api_explorer
        .is_visible
        .or(controller.api_explorer.is_visible);
    let is_visible = set_on_action_or_controller
        .or(app.api_explorer.is_visible)
        .unwrap_or(false);

    if set_on_action_or_controller == Some(true) && !descriptor.is_attribute_routed() {
        return Err(Error::ApiExplorerUnsupportedAction {
            action: descriptor.display_name.clone(),
        });
    }

    if is_visible && descriptor.is_attribute_routed() {
        descriptor.api_explorer = ApiExplorerModel {
            is_visible: Some(true),
            group_name: action
                .api_explorer
                .group_name
                .clone()
                .or_else(|| controller.api_explorer.group_name.clone()),
        };
    } else {
        descriptor.api_explorer.is_visible = Some(false);
    }
    Ok(())
}
