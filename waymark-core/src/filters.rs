//! Filter registration metadata and ordering.
//!
//! Filters are not executed here. The model only records which filters
//! apply where, and in which order they would run.

use serde::Serialize;

/// Well-known filter names added by built-in conventions.
pub mod names {
    pub const CLIENT_ERROR_RESULT: &str = "ClientErrorResultFilter";
    pub const MODEL_STATE_INVALID: &str = "ModelStateInvalidFilter";
    pub const CONSUMES: &str = "Consumes";
    pub const CONTROLLER_ACTION: &str = "ControllerActionFilter";
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum FilterKind {
    Action,
    Result,
    Authorization,
    Exception,
    Resource,
    /// Resource filter restricting request content types.
    Consumes(Vec<String>),
    /// Delegates to the controller's own filter hooks.
    ControllerDelegating,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilterMetadata {
    pub name: String,
    pub order: i32,
    pub kind: FilterKind,
}

impl FilterMetadata {
    pub fn new(name: impl Into<String>, kind: FilterKind) -> Self {
        Self {
            name: name.into(),
            order: 0,
            kind,
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn consumes(content_types: Vec<String>) -> Self {
        Self::new(names::CONSUMES, FilterKind::Consumes(content_types))
    }

    pub fn is_consumes(&self) -> bool {
        matches!(self.kind, FilterKind::Consumes(_))
    }
}

/// Where a filter was declared. Inner scopes run later at equal order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FilterScope {
    Global = 10,
    Controller = 20,
    Action = 30,
}

impl FilterScope {
    pub fn value(self) -> i32 {
        self as i32
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilterDescriptor {
    pub filter: FilterMetadata,
    pub order: i32,
    pub scope: FilterScope,
}

impl FilterDescriptor {
    pub fn new(filter: FilterMetadata, scope: FilterScope) -> Self {
        Self {
            order: filter.order,
            filter,
            scope,
        }
    }
}

/// Stable sort by `(order, scope)`.
pub fn sort_filter_descriptors(descriptors: &mut [FilterDescriptor]) {
    descriptors.sort_by_key(|d| (d.order, d.scope));
}
