//! String-keyed side table carried from model nodes to descriptors.

use serde::Serialize;

/// Key under which the matched API convention is stored.
pub const API_CONVENTION_RESULT: &str = "api-convention-result";
/// Key under which the default error response type is stored.
pub const ERROR_RESPONSE_TYPE: &str = "error-response-type";

/// Response shapes declared by a matched API convention method.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ApiConventionResult {
    pub convention: String,
    pub method: String,
    pub status_codes: Vec<u16>,
    pub produces_default_response: bool,
}

/// Type used for error responses that carry no explicit type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorResponseType {
    pub type_name: String,
}

impl ErrorResponseType {
    pub const PROBLEM_DETAILS: &'static str = "ProblemDetails";
    pub const VOID: &'static str = "void";

    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Text(String),
    ApiConventionResult(ApiConventionResult),
    ErrorResponseType(ErrorResponseType),
    Json(serde_json::Value),
}

/// Ordered map; setting an existing key replaces its value in place.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PropertyBag {
    entries: Vec<(String, PropertyValue)>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: PropertyValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overlay `other` onto this bag; `other` wins on conflicts.
    pub fn merge_from(&mut self, other: &PropertyBag) {
        for (key, value) in &other.entries {
            self.set(key.clone(), value.clone());
        }
    }

    pub fn api_convention_result(&self) -> Option<&ApiConventionResult> {
        match self.get(API_CONVENTION_RESULT) {
            Some(PropertyValue::ApiConventionResult(result)) => Some(result),
            _ => None,
        }
    }

    pub fn error_response_type(&self) -> Option<&ErrorResponseType> {
        match self.get(ERROR_RESPONSE_TYPE) {
            Some(PropertyValue::ErrorResponseType(ty)) => Some(ty),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_in_place() {
        let mut bag = PropertyBag::new();
        bag.set("a", PropertyValue::Int(1));
        bag.set("b", PropertyValue::Int(2));
        bag.set("a", PropertyValue::Int(3));
        let keys: Vec<_> = bag.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(bag.get("a"), Some(&PropertyValue::Int(3)));
    }

    #[test]
    fn test_merge_overlays() {
        let mut app = PropertyBag::new();
        app.set("shared", PropertyValue::Text("app".into()));
        app.set("app-only", PropertyValue::Bool(true));

        let mut action = PropertyBag::new();
        action.set("shared", PropertyValue::Text("action".into()));

        app.merge_from(&action);
        assert_eq!(app.get("shared"), Some(&PropertyValue::Text("action".into())));
        assert!(app.contains_key("app-only"));
    }

    #[test]
    fn test_typed_accessors() {
        let mut bag = PropertyBag::new();
        bag.set(
            ERROR_RESPONSE_TYPE,
            PropertyValue::ErrorResponseType(ErrorResponseType::new(ErrorResponseType::PROBLEM_DETAILS)),
        );
        assert_eq!(
            bag.error_response_type().map(|t| t.type_name.as_str()),
            Some("ProblemDetails")
        );
        assert!(bag.api_convention_result().is_none());
    }
}
