//! Mutable model of discovered controllers, actions and parameters.
//!
//! Nodes live in flat arenas owned by [`ApplicationModel`]. Parent links
//! (`ActionModel::controller`, `ParameterModel::action`) are plain ids, so a
//! convention holding `&mut ApplicationModel` can walk up and down freely.
//!
//! The arenas only hold storage. What belongs to the model is the tree
//! `controller_order` → `ControllerModel::actions` → `ActionModel::parameters`.
//! Unlinking an id from its parent removes the node; its arena slot stays
//! so every other id remains valid.

mod action;
mod controller;
mod parameter;
mod properties;
mod selector;

pub use action::{ActionModel, action_name_from_method};
pub use controller::{ControllerModel, controller_name};
pub use parameter::{BindingInfo, BindingSource, ParameterModel, PropertyModel};
pub use properties::{
    API_CONVENTION_RESULT, ApiConventionResult, ERROR_RESPONSE_TYPE, ErrorResponseType,
    PropertyBag, PropertyValue,
};
pub use selector::{ActionConstraint, CustomActionConstraint, SelectorModel};

use crate::filters::FilterMetadata;
use serde::Serialize;

macro_rules! arena_id {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        pub struct $name(pub usize);

        impl $name {
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

arena_id!(ControllerId);
arena_id!(ActionId);
arena_id!(ParameterId);

/// API explorer visibility and grouping.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ApiExplorerModel {
    pub is_visible: Option<bool>,
    pub group_name: Option<String>,
}

/// Route values in insertion order; keys compare without case.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RouteValueList {
    entries: Vec<(String, String)>,
}

impl RouteValueList {
    /// Insert or replace.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&key)) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Root of the model graph.
#[derive(Clone, Debug, Default)]
pub struct ApplicationModel {
    /// Controllers that are part of the model, in discovery order.
    pub controller_order: Vec<ControllerId>,
    pub controllers: Vec<ControllerModel>,
    pub actions: Vec<ActionModel>,
    pub parameters: Vec<ParameterModel>,
    pub filters: Vec<FilterMetadata>,
    pub properties: PropertyBag,
    pub api_explorer: ApiExplorerModel,
}

impl ApplicationModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_controller(&mut self, controller: ControllerModel) -> ControllerId {
        let id = ControllerId(self.controllers.len());
        self.controllers.push(controller);
        self.controller_order.push(id);
        id
    }

    /// Adds the action and links it to its controller.
    pub fn add_action(&mut self, mut action: ActionModel) -> ActionId {
        let id = ActionId(self.actions.len());
        let controller = action.controller;
        action.parameters.clear();
        self.actions.push(action);
        self.controllers[controller.index()].actions.push(id);
        id
    }

    /// Adds the parameter and links it to its action.
    pub fn add_parameter(&mut self, parameter: ParameterModel) -> ParameterId {
        let id = ParameterId(self.parameters.len());
        let action = parameter.action;
        self.parameters.push(parameter);
        self.actions[action.index()].parameters.push(id);
        id
    }

    pub fn controller(&self, id: ControllerId) -> &ControllerModel {
        &self.controllers[id.index()]
    }

    pub fn controller_mut(&mut self, id: ControllerId) -> &mut ControllerModel {
        &mut self.controllers[id.index()]
    }

    pub fn action(&self, id: ActionId) -> &ActionModel {
        &self.actions[id.index()]
    }

    pub fn action_mut(&mut self, id: ActionId) -> &mut ActionModel {
        &mut self.actions[id.index()]
    }

    pub fn parameter(&self, id: ParameterId) -> &ParameterModel {
        &self.parameters[id.index()]
    }

    pub fn parameter_mut(&mut self, id: ParameterId) -> &mut ParameterModel {
        &mut self.parameters[id.index()]
    }

    /// Linked controllers, snapshotted so the caller may mutate the model.
    pub fn controller_ids(&self) -> impl Iterator<Item = ControllerId> + use<> {
        self.controller_order.clone().into_iter()
    }

    /// Linked actions, controller by controller.
    pub fn action_ids(&self) -> impl Iterator<Item = ActionId> + use<> {
        let ids: Vec<ActionId> = self
            .controller_order
            .iter()
            .flat_map(|&c| self.controller(c).actions.iter().copied())
            .collect();
        ids.into_iter()
    }

    /// Linked parameters, action by action.
    pub fn parameter_ids(&self) -> impl Iterator<Item = ParameterId> + use<> {
        let ids: Vec<ParameterId> = self
            .action_ids()
            .flat_map(|a| self.action(a).parameters.iter().copied())
            .collect();
        ids.into_iter()
    }

    pub fn has_controller(&self, id: ControllerId) -> bool {
        self.controller_order.contains(&id)
    }

    pub fn has_action(&self, id: ActionId) -> bool {
        let controller = self.action(id).controller;
        self.has_controller(controller) && self.controller(controller).actions.contains(&id)
    }

    pub fn has_parameter(&self, id: ParameterId) -> bool {
        let action = self.parameter(id).action;
        self.has_action(action) && self.action(action).parameters.contains(&id)
    }

    /// Unlinks a controller and, with it, all of its actions.
    pub fn remove_controller(&mut self, id: ControllerId) -> bool {
        let before = self.controller_order.len();
        self.controller_order.retain(|&c| c != id);
        self.controller_order.len() != before
    }

    pub fn remove_action(&mut self, id: ActionId) -> bool {
        let controller = self.action(id).controller;
        let actions = &mut self.controller_mut(controller).actions;
        let before = actions.len();
        actions.retain(|&a| a != id);
        actions.len() != before
    }

    pub fn remove_parameter(&mut self, id: ParameterId) -> bool {
        let action = self.parameter(id).action;
        let parameters = &mut self.action_mut(action).parameters;
        let before = parameters.len();
        parameters.retain(|&p| p != id);
        parameters.len() != before
    }

    /// Actions of one controller, in declaration order.
    pub fn actions_of(&self, controller: ControllerId) -> impl Iterator<Item = &ActionModel> {
        self.controller(controller)
            .actions
            .iter()
            .map(|id| self.action(*id))
    }

    pub fn parameters_of(&self, action: ActionId) -> impl Iterator<Item = &ParameterModel> {
        self.action(action)
            .parameters
            .iter()
            .map(|id| self.parameter(*id))
    }

    pub fn controller_of(&self, action: ActionId) -> &ControllerModel {
        self.controller(self.action(action).controller)
    }

    /// `Namespace.HomeController.Index (Part)`.
    pub fn action_display_name(&self, action: ActionId) -> String {
        let model = self.action(action);
        let controller = self.controller(model.controller);
        format!(
            "{}.{} ({})",
            controller.display_name(),
            model.method.name,
            controller.part.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{ApplicationPart, ControllerType, MethodInfo, TypeRef};
    use crate::metadata::MetadataList;
    use std::sync::Arc;

    fn model_with_action() -> (ApplicationModel, ControllerId, ActionId) {
        let mut app = ApplicationModel::new();
        let ty = Arc::new(ControllerType::new("OrdersController").with_namespace("Shop"));
        let part = Arc::new(ApplicationPart::new("Shop.Web"));
        let controller = app.add_controller(ControllerModel::new(ty, part));
        let action = app.add_action(ActionModel::new(
            controller,
            Arc::new(MethodInfo::new("Get")),
            "Get".into(),
        ));
        (app, controller, action)
    }

    #[test]
    fn test_arena_links() {
        let (mut app, controller, action) = model_with_action();
        let parameter = app.add_parameter(ParameterModel {
            action,
            parameter_name: "id".into(),
            ty: TypeRef::simple("int"),
            metadata: MetadataList::default(),
            binding_info: None,
            is_params: false,
            properties: PropertyBag::new(),
        });

        assert_eq!(app.controller(controller).actions, vec![action]);
        assert_eq!(app.action(action).parameters, vec![parameter]);
        assert_eq!(app.parameter(parameter).action, action);
        assert_eq!(app.controller_of(action).controller_name, "Orders");
        assert_eq!(app.parameters_of(action).count(), 1);
    }

    #[test]
    fn test_removed_nodes_leave_the_tree() {
        let (mut app, controller, first) = model_with_action();
        let second = app.add_action(ActionModel::new(
            controller,
            Arc::new(MethodInfo::new("List")),
            "List".into(),
        ));
        let other = app.add_controller(ControllerModel::new(
            Arc::new(ControllerType::new("UsersController")),
            Arc::new(ApplicationPart::new("Shop.Web")),
        ));
        let third = app.add_action(ActionModel::new(
            other,
            Arc::new(MethodInfo::new("Index")),
            "Index".into(),
        ));

        assert!(app.remove_action(first));
        assert!(!app.remove_action(first));
        assert!(!app.has_action(first));
        assert_eq!(app.action_ids().collect::<Vec<_>>(), vec![second, third]);

        assert!(app.remove_controller(controller));
        assert_eq!(app.controller_ids().collect::<Vec<_>>(), vec![other]);
        assert!(!app.has_action(second));
        assert_eq!(app.action_ids().collect::<Vec<_>>(), vec![third]);
        assert_eq!(app.controller(other).controller_name, "Users");
    }

    #[test]
    fn test_action_display_name() {
        let (app, _, action) = model_with_action();
        assert_eq!(app.action_display_name(action), "Shop.OrdersController.Get (Shop.Web)");
    }

    #[test]
    fn test_route_value_list_ignores_key_case() {
        let mut values = RouteValueList::default();
        values.set("Area", "admin");
        values.set("area", "billing");
        assert_eq!(values.get("AREA"), Some("billing"));
        assert_eq!(values.iter().count(), 1);
    }
}
