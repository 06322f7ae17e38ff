//! Declarative metadata attached to controllers, actions, parameters and parts.
//!
//! Every piece of metadata is a [`Metadata`] variant. Consumers query a
//! [`MetadataList`] by kind instead of inspecting runtime types, e.g.
//! "all route-template providers" or "the first `ActionName`".

use crate::application_model::{ActionConstraint, BindingSource};
use crate::conventions::{ActionModelConvention, ControllerModelConvention, ParameterModelConvention};
use crate::filters::FilterMetadata;
use std::fmt;
use std::sync::Arc;

/// HTTP methods with a canonical upper-case spelling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            "PATCH" => Some(HttpMethod::Patch),
            "HEAD" => Some(HttpMethod::Head),
            "OPTIONS" => Some(HttpMethod::Options),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Route("template")`: a route template with optional order and name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteAttribute {
    pub template: String,
    pub order: Option<i32>,
    pub name: Option<String>,
}

impl RouteAttribute {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            order: None,
            name: None,
        }
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// `HttpGet`, `HttpPost`, `AcceptVerbs`, ...: constrains HTTP methods and
/// optionally defines a route of its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpMethodAttribute {
    pub methods: Vec<String>,
    pub template: Option<String>,
    pub order: Option<i32>,
    pub name: Option<String>,
}

impl HttpMethodAttribute {
    pub fn new(method: HttpMethod) -> Self {
        Self::accept_verbs([method])
    }

    pub fn accept_verbs(methods: impl IntoIterator<Item = HttpMethod>) -> Self {
        Self {
            methods: methods.into_iter().map(|m| m.as_str().to_string()).collect(),
            template: None,
            order: None,
            name: None,
        }
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Borrowed view of anything that can contribute an attribute route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteTemplateProvider<'a> {
    pub template: Option<&'a str>,
    pub order: Option<i32>,
    pub name: Option<&'a str>,
}

impl RouteTemplateProvider<'_> {
    /// A provider with no template, order or name (e.g. a bare `HttpGet`)
    /// does not define a route by itself.
    pub fn is_silent(&self) -> bool {
        self.template.is_none() && self.order.is_none() && self.name.is_none()
    }
}

/// One declared piece of metadata.
#[derive(Clone)]
pub enum Metadata {
    Route(RouteAttribute),
    HttpMethod(HttpMethodAttribute),
    /// Endpoint-only record of the HTTP methods a selector accepts.
    AllowedMethods(Vec<String>),
    Filter(FilterMetadata),
    Constraint(ActionConstraint),
    Consumes(Vec<String>),
    ApiController,
    /// Names a registered API convention type to match actions against.
    ApiConventionType(String),
    /// Pins an action to a single method of a convention type.
    ApiConventionMethod { convention: String, method: String },
    ProducesErrorResponseType(String),
    ProducesResponseType(u16),
    BindingSource {
        source: BindingSource,
        name: Option<String>,
    },
    BindProperty,
    BindProperties,
    NonAction,
    NonController,
    Controller,
    ActionName(String),
    /// A route value such as `area = "admin"`.
    RouteValue { key: String, value: String },
    ApiExplorerSettings {
        ignore_api: Option<bool>,
        group_name: Option<String>,
    },
    ControllerConvention(Arc<dyn ControllerModelConvention>),
    ActionConvention(Arc<dyn ActionModelConvention>),
    ParameterConvention(Arc<dyn ParameterModelConvention>),
    Custom { kind: String, value: String },
}

impl Metadata {
    pub fn route(template: impl Into<String>) -> Self {
        Metadata::Route(RouteAttribute::new(template))
    }

    pub fn http(method: HttpMethod) -> Self {
        Metadata::HttpMethod(HttpMethodAttribute::new(method))
    }

    pub fn http_with_template(method: HttpMethod, template: impl Into<String>) -> Self {
        Metadata::HttpMethod(HttpMethodAttribute::new(method).template(template))
    }

    pub fn area(area: impl Into<String>) -> Self {
        Metadata::RouteValue {
            key: "area".to_string(),
            value: area.into(),
        }
    }

    pub fn from_source(source: BindingSource) -> Self {
        Metadata::BindingSource { source, name: None }
    }

    /// Route-template view, if this metadata can define an attribute route.
    pub fn route_template_provider(&self) -> Option<RouteTemplateProvider<'_>> {
        match self {
            Metadata::Route(route) => Some(RouteTemplateProvider {
                template: Some(route.template.as_str()),
                order: route.order,
                name: route.name.as_deref(),
            }),
            Metadata::HttpMethod(http) => Some(RouteTemplateProvider {
                template: http.template.as_deref(),
                order: http.order,
                name: http.name.as_deref(),
            }),
            _ => None,
        }
    }

    pub fn is_route_template_provider(&self) -> bool {
        self.route_template_provider().is_some()
    }

    pub fn http_methods(&self) -> Option<&[String]> {
        match self {
            Metadata::HttpMethod(http) => Some(&http.methods),
            _ => None,
        }
    }

    /// Short tag used in diagnostics.
    pub fn kind(&self) -> &str {
        match self {
            Metadata::Route(_) => "route",
            Metadata::HttpMethod(_) => "http-method",
            Metadata::AllowedMethods(_) => "allowed-methods",
            Metadata::Filter(_) => "filter",
            Metadata::Constraint(_) => "constraint",
            Metadata::Consumes(_) => "consumes",
            Metadata::ApiController => "api-controller",
            Metadata::ApiConventionType(_) => "api-convention-type",
            Metadata::ApiConventionMethod { .. } => "api-convention-method",
            Metadata::ProducesErrorResponseType(_) => "produces-error-response-type",
            Metadata::ProducesResponseType(_) => "produces-response-type",
            Metadata::BindingSource { .. } => "binding-source",
            Metadata::BindProperty => "bind-property",
            Metadata::BindProperties => "bind-properties",
            Metadata::NonAction => "non-action",
            Metadata::NonController => "non-controller",
            Metadata::Controller => "controller",
            Metadata::ActionName(_) => "action-name",
            Metadata::RouteValue { .. } => "route-value",
            Metadata::ApiExplorerSettings { .. } => "api-explorer-settings",
            Metadata::ControllerConvention(_) => "controller-convention",
            Metadata::ActionConvention(_) => "action-convention",
            Metadata::ParameterConvention(_) => "parameter-convention",
            Metadata::Custom { kind, .. } => kind,
        }
    }
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metadata::Route(route) => f.debug_tuple("Route").field(route).finish(),
            Metadata::HttpMethod(http) => f.debug_tuple("HttpMethod").field(http).finish(),
            Metadata::AllowedMethods(methods) => {
                f.debug_tuple("AllowedMethods").field(methods).finish()
            }
            Metadata::Filter(filter) => f.debug_tuple("Filter").field(filter).finish(),
            Metadata::Constraint(c) => f.debug_tuple("Constraint").field(c).finish(),
            Metadata::Consumes(types) => f.debug_tuple("Consumes").field(types).finish(),
            Metadata::ApiConventionType(name) => {
                f.debug_tuple("ApiConventionType").field(name).finish()
            }
            Metadata::ApiConventionMethod { convention, method } => f
                .debug_struct("ApiConventionMethod")
                .field("convention", convention)
                .field("method", method)
                .finish(),
            Metadata::ProducesErrorResponseType(ty) => {
                f.debug_tuple("ProducesErrorResponseType").field(ty).finish()
            }
            Metadata::ProducesResponseType(status) => {
                f.debug_tuple("ProducesResponseType").field(status).finish()
            }
            Metadata::BindingSource { source, name } => f
                .debug_struct("BindingSource")
                .field("source", source)
                .field("name", name)
                .finish(),
            Metadata::ActionName(name) => f.debug_tuple("ActionName").field(name).finish(),
            Metadata::RouteValue { key, value } => f
                .debug_struct("RouteValue")
                .field("key", key)
                .field("value", value)
                .finish(),
            Metadata::ApiExplorerSettings {
                ignore_api,
                group_name,
            } => f
                .debug_struct("ApiExplorerSettings")
                .field("ignore_api", ignore_api)
                .field("group_name", group_name)
                .finish(),
            Metadata::Custom { kind, value } => f
                .debug_struct("Custom")
                .field("kind", kind)
                .field("value", value)
                .finish(),
            other => f.write_str(other.kind()),
        }
    }
}

/// Ordered, read-only list of metadata with kind-based queries.
#[derive(Clone, Debug, Default)]
pub struct MetadataList {
    items: Arc<[Metadata]>,
}

impl MetadataList {
    pub fn new(items: Vec<Metadata>) -> Self {
        Self {
            items: items.into(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Metadata> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Metadata] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_api_controller(&self) -> bool {
        self.iter().any(|m| matches!(m, Metadata::ApiController))
    }

    pub fn is_non_action(&self) -> bool {
        self.iter().any(|m| matches!(m, Metadata::NonAction))
    }

    pub fn is_non_controller(&self) -> bool {
        self.iter().any(|m| matches!(m, Metadata::NonController))
    }

    pub fn is_controller(&self) -> bool {
        self.iter().any(|m| matches!(m, Metadata::Controller))
    }

    pub fn has_bind_properties(&self) -> bool {
        self.iter().any(|m| matches!(m, Metadata::BindProperties))
    }

    pub fn action_name(&self) -> Option<&str> {
        self.iter().find_map(|m| match m {
            Metadata::ActionName(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn filters(&self) -> impl Iterator<Item = &FilterMetadata> {
        self.iter().filter_map(|m| match m {
            Metadata::Filter(filter) => Some(filter),
            _ => None,
        })
    }

    pub fn route_values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter_map(|m| match m {
            Metadata::RouteValue { key, value } => Some((key.as_str(), value.as_str())),
            _ => None,
        })
    }

    pub fn route_template_providers(&self) -> impl Iterator<Item = &Metadata> {
        self.iter().filter(|m| m.is_route_template_provider())
    }

    pub fn api_convention_types(&self) -> impl Iterator<Item = &str> {
        self.iter().filter_map(|m| match m {
            Metadata::ApiConventionType(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn api_convention_method(&self) -> Option<(&str, &str)> {
        self.iter().find_map(|m| match m {
            Metadata::ApiConventionMethod { convention, method } => {
                Some((convention.as_str(), method.as_str()))
            }
            _ => None,
        })
    }

    /// Status codes declared with `ProducesResponseType`.
    pub fn produces_response_types(&self) -> impl Iterator<Item = u16> + '_ {
        self.iter().filter_map(|m| match m {
            Metadata::ProducesResponseType(status) => Some(*status),
            _ => None,
        })
    }

    pub fn produces_error_response_type(&self) -> Option<&str> {
        self.iter().find_map(|m| match m {
            Metadata::ProducesErrorResponseType(ty) => Some(ty.as_str()),
            _ => None,
        })
    }

    /// `(ignore_api, group_name)` from the first `ApiExplorerSettings`.
    pub fn api_explorer_settings(&self) -> Option<(Option<bool>, Option<&str>)> {
        self.iter().find_map(|m| match m {
            Metadata::ApiExplorerSettings {
                ignore_api,
                group_name,
            } => Some((*ignore_api, group_name.as_deref())),
            _ => None,
        })
    }

    pub fn controller_conventions(&self) -> Vec<Arc<dyn ControllerModelConvention>> {
        self.iter()
            .filter_map(|m| match m {
                Metadata::ControllerConvention(c) => Some(Arc::clone(c)),
                _ => None,
            })
            .collect()
    }

    pub fn action_conventions(&self) -> Vec<Arc<dyn ActionModelConvention>> {
        self.iter()
            .filter_map(|m| match m {
                Metadata::ActionConvention(c) => Some(Arc::clone(c)),
                _ => None,
            })
            .collect()
    }

    pub fn parameter_conventions(&self) -> Vec<Arc<dyn ParameterModelConvention>> {
        self.iter()
            .filter_map(|m| match m {
                Metadata::ParameterConvention(c) => Some(Arc::clone(c)),
                _ => None,
            })
            .collect()
    }
}

impl From<Vec<Metadata>> for MetadataList {
    fn from(items: Vec<Metadata>) -> Self {
        Self::new(items)
    }
}

impl<'a> IntoIterator for &'a MetadataList {
    type Item = &'a Metadata;
    type IntoIter = std::slice::Iter<'a, Metadata>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
