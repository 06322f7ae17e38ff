use crate::action_selector::RequestContext;
use crate::attribute_route::AttributeRouteModel;
use crate::metadata::Metadata;
use std::fmt;
use std::sync::Arc;

/// User-defined request predicate attached to a selector.
pub trait CustomActionConstraint: Send + Sync + fmt::Debug {
    fn order(&self) -> i32;

    fn accept(&self, request: &RequestContext<'_>) -> bool;
}

/// Request predicate an action must satisfy to be selected.
#[derive(Clone, Debug)]
pub enum ActionConstraint {
    /// Accepted HTTP methods (upper case).
    HttpMethod(Vec<String>),
    /// Accepted request content types.
    Consumes(Vec<String>),
    Custom(Arc<dyn CustomActionConstraint>),
}

impl ActionConstraint {
    pub const HTTP_METHOD_ORDER: i32 = 100;
    pub const CONSUMES_ORDER: i32 = 200;

    pub fn order(&self) -> i32 {
        match self {
            ActionConstraint::HttpMethod(_) => Self::HTTP_METHOD_ORDER,
            ActionConstraint::Consumes(_) => Self::CONSUMES_ORDER,
            ActionConstraint::Custom(c) => c.order(),
        }
    }

    pub fn accept(&self, request: &RequestContext<'_>) -> bool {
        match self {
            ActionConstraint::HttpMethod(methods) => {
                methods.is_empty() || methods.iter().any(|m| m.eq_ignore_ascii_case(request.method))
            }
            ActionConstraint::Consumes(content_types) => match request.content_type {
                None => true,
                Some(actual) => content_types
                    .iter()
                    .any(|expected| media_type_matches(expected, actual)),
            },
            ActionConstraint::Custom(c) => c.accept(request),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ActionConstraint::HttpMethod(methods) => format!("HttpMethod({})", methods.join(", ")),
            ActionConstraint::Consumes(types) => format!("Consumes({})", types.join(", ")),
            ActionConstraint::Custom(c) => format!("{c:?}"),
        }
    }
}

/// `expected` may use `*/*` or `type/*`; parameters are ignored.
fn media_type_matches(expected: &str, actual: &str) -> bool {
    let essence = |s: &str| s.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    let expected = essence(expected);
    let actual = essence(actual);

    if expected == "*/*" || expected == actual {
        return true;
    }
    match (expected.split_once('/'), actual.split_once('/')) {
        (Some((et, "*")), Some((at, _))) => et == at,
        _ => false,
    }
}

/// One route through which an action or controller can be reached.
#[derive(Clone, Debug, Default)]
pub struct SelectorModel {
    pub attribute_route_model: Option<AttributeRouteModel>,
    pub action_constraints: Vec<ActionConstraint>,
    pub endpoint_metadata: Vec<Metadata>,
}

impl SelectorModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(route: AttributeRouteModel) -> Self {
        Self {
            attribute_route_model: Some(route),
            ..Self::default()
        }
    }

    pub fn is_attribute_routed(&self) -> bool {
        self.attribute_route_model.is_some()
    }

    pub fn http_methods(&self) -> Vec<&str> {
        self.action_constraints
            .iter()
            .filter_map(|c| match c {
                ActionConstraint::HttpMethod(methods) => Some(methods.iter().map(String::as_str)),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(method: &'a str, content_type: Option<&'a str>) -> RequestContext<'a> {
        RequestContext {
            method,
            content_type,
        }
    }

    #[test]
    fn test_http_method_constraint() {
        let c = ActionConstraint::HttpMethod(vec!["GET".into(), "HEAD".into()]);
        assert!(c.accept(&request("get", None)));
        assert!(!c.accept(&request("POST", None)));
        assert!(ActionConstraint::HttpMethod(vec![]).accept(&request("DELETE", None)));
    }

    #[test]
    fn test_consumes_constraint() {
        let c = ActionConstraint::Consumes(vec!["application/json".into(), "text/*".into()]);
        assert!(c.accept(&request("POST", Some("application/json; charset=utf-8"))));
        assert!(c.accept(&request("POST", Some("text/plain"))));
        assert!(!c.accept(&request("POST", Some("multipart/form-data"))));
        assert!(c.accept(&request("POST", None)));
    }

    #[test]
    fn test_constraint_orders() {
        assert_eq!(ActionConstraint::HttpMethod(vec![]).order(), 100);
        assert_eq!(ActionConstraint::Consumes(vec![]).order(), 200);
    }
}
