//! Immutable request-time description of one invocable action.

use crate::application_model::{
    ActionConstraint, ApiExplorerModel, BindingInfo, PropertyBag,
};
use crate::attribute_route::AttributeRouteInfo;
use crate::discovery::TypeRef;
use crate::filters::FilterDescriptor;
use crate::metadata::Metadata;
use uuid::Uuid;

/// Route values of a descriptor.
///
/// Keys compare without case. A key may be present with no value, which
/// means the descriptor must not match a request carrying that key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteValues {
    entries: Vec<(String, Option<String>)>,
}

impl RouteValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the key already exists. Returns whether it was inserted.
    pub fn try_insert(&mut self, key: impl Into<String>, value: Option<String>) -> bool {
        let key = key.into();
        if self.contains_key(&key) {
            return false;
        }
        self.entries.push((key, value));
        true
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k.eq_ignore_ascii_case(key))
    }

    /// The value for `key`; `None` both when absent and when null.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for RouteValues {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        let mut values = RouteValues::new();
        for (key, value) in iter {
            values.try_insert(key, value);
        }
        values
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub parameter_type: TypeRef,
    pub binding_info: Option<BindingInfo>,
}

#[derive(Clone, Debug)]
pub struct ActionDescriptor {
    /// Unique per descriptor instance, regenerated on every rebuild.
    pub id: String,
    pub display_name: String,
    pub route_values: RouteValues,
    pub filter_descriptors: Vec<FilterDescriptor>,
    pub parameters: Vec<ParameterDescriptor>,
    pub bound_properties: Vec<ParameterDescriptor>,
    pub attribute_route_info: Option<AttributeRouteInfo>,
    pub properties: PropertyBag,
    pub action_constraints: Vec<ActionConstraint>,
    pub endpoint_metadata: Vec<Metadata>,
    pub api_explorer: ApiExplorerModel,
    pub controller_name: String,
    pub action_name: String,
    pub method_name: String,
    pub controller_type_name: String,
}

impl ActionDescriptor {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            display_name: display_name.into(),
            route_values: RouteValues::new(),
            filter_descriptors: Vec::new(),
            parameters: Vec::new(),
            bound_properties: Vec::new(),
            attribute_route_info: None,
            properties: PropertyBag::new(),
            action_constraints: Vec::new(),
            endpoint_metadata: Vec::new(),
            api_explorer: ApiExplorerModel::default(),
            controller_name: String::new(),
            action_name: String::new(),
            method_name: String::new(),
            controller_type_name: String::new(),
        }
    }

    pub fn is_attribute_routed(&self) -> bool {
        self.attribute_route_info.is_some()
    }
}
