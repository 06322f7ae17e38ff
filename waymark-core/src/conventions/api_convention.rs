//! API conventions: response shapes inferred from action signatures.
//!
//! A convention type is a set of template methods. An action matches a
//! template method when its name and parameters satisfy the template's
//! match behaviours; the template's response status codes are then recorded
//! on the action under [`API_CONVENTION_RESULT`].

use super::ActionModelConvention;
use crate::application_model::{
    API_CONVENTION_RESULT, ActionId, ApiConventionResult, ApplicationModel, ERROR_RESPONSE_TYPE,
    ErrorResponseType, PropertyValue,
};
use crate::discovery::{MethodInfo, TypeRef};
use crate::error::Result;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum NameMatchBehavior {
    #[default]
    Exact,
    /// `Get` matches `GetOrders` but not `Getaway`.
    Prefix,
    /// `id` matches `orderId` but not `paid`.
    Suffix,
    Any,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TypeMatchBehavior {
    Any,
    #[default]
    AssignableFrom,
}

#[derive(Clone, Debug)]
pub struct ConventionParameter {
    pub name: String,
    pub ty: TypeRef,
    pub name_match: NameMatchBehavior,
    pub type_match: TypeMatchBehavior,
    /// Matches all remaining action parameters.
    pub is_params: bool,
}

impl ConventionParameter {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            name_match: NameMatchBehavior::default(),
            type_match: TypeMatchBehavior::default(),
            is_params: false,
        }
    }

    pub fn name_match(mut self, behavior: NameMatchBehavior) -> Self {
        self.name_match = behavior;
        self
    }

    pub fn type_match(mut self, behavior: TypeMatchBehavior) -> Self {
        self.type_match = behavior;
        self
    }

    pub fn params(mut self) -> Self {
        self.is_params = true;
        self
    }
}

#[derive(Clone, Debug)]
pub struct ConventionMethod {
    pub name: String,
    pub name_match: NameMatchBehavior,
    pub parameters: Vec<ConventionParameter>,
    pub status_codes: Vec<u16>,
    pub produces_default_response: bool,
}

impl ConventionMethod {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            name_match: NameMatchBehavior::default(),
            parameters: Vec::new(),
            status_codes: Vec::new(),
            produces_default_response: false,
        }
    }

    pub fn name_match(mut self, behavior: NameMatchBehavior) -> Self {
        self.name_match = behavior;
        self
    }

    pub fn parameter(mut self, parameter: ConventionParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn produces(mut self, status: u16) -> Self {
        self.status_codes.push(status);
        self
    }

    pub fn produces_default(mut self) -> Self {
        self.produces_default_response = true;
        self
    }

    /// Does `method` follow this template?
    pub fn is_match(&self, method: &MethodInfo) -> bool {
        if !is_name_match(&method.name, &self.name, self.name_match) {
            return false;
        }

        for (i, convention) in self.parameters.iter().enumerate() {
            if convention.is_params {
                return true;
            }
            let Some(actual) = method.parameters.get(i) else {
                return false;
            };
            if !is_type_match(&actual.ty, &convention.ty, convention.type_match)
                || !is_name_match(&actual.name, &convention.name, convention.name_match)
            {
                return false;
            }
        }

        self.parameters.len() == method.parameters.len()
    }
}

pub fn is_name_match(name: &str, convention: &str, behavior: NameMatchBehavior) -> bool {
    match behavior {
        NameMatchBehavior::Any => true,
        NameMatchBehavior::Exact => name == convention,
        NameMatchBehavior::Prefix => {
            let Some(rest) = name.strip_prefix(convention) else {
                return false;
            };
            rest.chars().next().is_none_or(char::is_uppercase)
        }
        NameMatchBehavior::Suffix => {
            if name.len() < convention.len() || !name.is_char_boundary(name.len() - convention.len()) {
                return false;
            }
            let (head, tail) = name.split_at(name.len() - convention.len());
            if !tail.eq_ignore_ascii_case(convention) {
                return false;
            }
            if head.is_empty() {
                return true;
            }
            let before_is_lower = head.chars().next_back().is_some_and(char::is_lowercase);
            let first_is_upper = tail.chars().next().is_some_and(char::is_uppercase);
            before_is_lower && first_is_upper
        }
    }
}

pub fn is_type_match(ty: &TypeRef, convention: &TypeRef, behavior: TypeMatchBehavior) -> bool {
    match behavior {
        TypeMatchBehavior::Any => true,
        TypeMatchBehavior::AssignableFrom => convention.is_assignable_from(ty),
    }
}

/// A named group of convention methods.
#[derive(Clone, Debug)]
pub struct ApiConventionType {
    pub name: String,
    pub methods: Vec<ConventionMethod>,
}

impl ApiConventionType {
    pub fn new(name: impl Into<String>, methods: Vec<ConventionMethod>) -> Self {
        Self {
            name: name.into(),
            methods,
        }
    }

    pub fn method(&self, name: &str) -> Option<&ConventionMethod> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// The built-in CRUD conventions.
    pub fn default_conventions() -> Self {
        let id = || {
            ConventionParameter::new("id", TypeRef::object())
                .name_match(NameMatchBehavior::Suffix)
                .type_match(TypeMatchBehavior::Any)
        };
        let model = || {
            ConventionParameter::new("model", TypeRef::object())
                .name_match(NameMatchBehavior::Any)
                .type_match(TypeMatchBehavior::Any)
        };
        let lookup = |name: &str| {
            ConventionMethod::new(name)
                .name_match(NameMatchBehavior::Prefix)
                .parameter(id())
                .produces(200)
                .produces(404)
                .produces_default()
        };
        let create = |name: &str| {
            ConventionMethod::new(name)
                .name_match(NameMatchBehavior::Prefix)
                .parameter(model())
                .produces(201)
                .produces(400)
                .produces_default()
        };
        let update = |name: &str| {
            ConventionMethod::new(name)
                .name_match(NameMatchBehavior::Prefix)
                .parameter(id())
                .parameter(model())
                .produces(204)
                .produces(404)
                .produces(400)
                .produces_default()
        };

        Self::new(
            DEFAULT_API_CONVENTIONS,
            vec![
                lookup("Get"),
                lookup("Find"),
                create("Post"),
                create("Create"),
                update("Put"),
                update("Edit"),
                update("Update"),
                ConventionMethod::new("Delete")
                    .name_match(NameMatchBehavior::Prefix)
                    .parameter(id())
                    .produces(200)
                    .produces(404)
                    .produces(400)
                    .produces_default(),
            ],
        )
    }
}

pub const DEFAULT_API_CONVENTIONS: &str = "DefaultApiConventions";

/// Convention types that metadata can refer to by name.
#[derive(Clone, Debug)]
pub struct ApiConventionCatalog {
    types: Vec<Arc<ApiConventionType>>,
}

impl Default for ApiConventionCatalog {
    fn default() -> Self {
        Self {
            types: vec![Arc::new(ApiConventionType::default_conventions())],
        }
    }
}

impl ApiConventionCatalog {
    pub fn empty() -> Self {
        Self { types: Vec::new() }
    }

    pub fn register(&mut self, ty: ApiConventionType) {
        self.types.retain(|t| t.name != ty.name);
        self.types.push(Arc::new(ty));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ApiConventionType>> {
        self.types.iter().find(|t| t.name == name)
    }
}

/// Attaches the matched API convention and the default error response type
/// to each action.
pub struct ApiConventionApplicationModelConvention {
    catalog: ApiConventionCatalog,
    default_error_type: ErrorResponseType,
}

impl ApiConventionApplicationModelConvention {
    pub fn new(catalog: ApiConventionCatalog, default_error_type: ErrorResponseType) -> Self {
        Self {
            catalog,
            default_error_type,
        }
    }

    fn discover_api_convention(&self, app: &ApplicationModel, action: ActionId) -> Option<ApiConventionResult> {
        let model = app.action(action);
        let controller = app.controller(model.controller);

        let to_result = |ty: &ApiConventionType, method: &ConventionMethod| ApiConventionResult {
            convention: ty.name.clone(),
            method: method.name.clone(),
            status_codes: method.status_codes.clone(),
            produces_default_response: method.produces_default_response,
        };

        // Declared response types take the place of any convention.
        if model.metadata.produces_response_types().next().is_some() {
            return None;
        }

        if let Some((convention, method)) = model.metadata.api_convention_method() {
            let ty = self.catalog.get(convention)?;
            let method = ty.method(method)?;
            return Some(to_result(ty, method));
        }

        let mut names: Vec<&str> = controller.metadata.api_convention_types().collect();
        if names.is_empty() {
            names = controller.part.metadata.api_convention_types().collect();
        }

        names
            .into_iter()
            .filter_map(|name| {
                let found = self.catalog.get(name);
                if found.is_none() {
                    waymark_log::warn!("Unknown API convention type '{}'", name);
                }
                found
            })
            .find_map(|ty| {
                ty.methods
                    .iter()
                    .find(|m| m.is_match(&model.method))
                    .map(|m| to_result(ty, m))
            })
    }

    fn discover_error_type(&self, app: &ApplicationModel, action: ActionId) -> ErrorResponseType {
        let model = app.action(action);
        let controller = app.controller(model.controller);

        model
            .metadata
            .produces_error_response_type()
            .or_else(|| controller.metadata.produces_error_response_type())
            .or_else(|| controller.part.metadata.produces_error_response_type())
            .map(ErrorResponseType::new)
            .unwrap_or_else(|| self.default_error_type.clone())
    }
}

impl ActionModelConvention for ApiConventionApplicationModelConvention {
    fn apply(&self, app: &mut ApplicationModel, action: ActionId) -> Result<()> {
        let convention = self.discover_api_convention(app, action);
        let error_type = self.discover_error_type(app, action);

        let properties = &mut app.action_mut(action).properties;
        if let Some(result) = convention {
            properties.set(API_CONVENTION_RESULT, PropertyValue::ApiConventionResult(result));
        }
        properties.set(ERROR_RESPONSE_TYPE, PropertyValue::ErrorResponseType(error_type));
        Ok(())
    }
}
