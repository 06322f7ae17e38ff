//! Options controlling model building.

use crate::conventions::ConventionRegistry;
use crate::conventions::api_convention::ApiConventionCatalog;
use crate::filters::FilterMetadata;
use serde::{Deserialize, Serialize};

/// Switches for the conventions applied to API controllers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiBehaviorOptions {
    pub suppress_map_client_errors: bool,
    pub suppress_model_state_invalid_filter: bool,
    pub suppress_consumes_constraint_for_form_file_parameters: bool,
    pub suppress_infer_binding_sources_for_parameters: bool,
    pub allow_inferring_binding_source_for_collection_types_as_from_query: bool,
}

/// The serialisable part of [`MvcOptions`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MvcSettings {
    /// Strip `Async` from method names when naming actions.
    pub suppress_async_suffix_in_action_names: bool,
}

impl Default for MvcSettings {
    fn default() -> Self {
        Self {
            suppress_async_suffix_in_action_names: true,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MvcOptions {
    pub settings: MvcSettings,
    /// Filters applied to every action.
    pub filters: Vec<FilterMetadata>,
    pub conventions: ConventionRegistry,
    pub api_conventions: ApiConventionCatalog,
}

impl MvcOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(mut self, settings: MvcSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_filter(mut self, filter: FilterMetadata) -> Self {
        self.filters.push(filter);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = MvcOptions::default();
        assert!(options.settings.suppress_async_suffix_in_action_names);
        assert!(options.filters.is_empty());

        let api = ApiBehaviorOptions::default();
        assert!(!api.suppress_map_client_errors);
    }

    #[test]
    fn test_deserialize_partial() {
        let api: ApiBehaviorOptions =
            serde_json::from_str(r#"{"suppress_map_client_errors": true}"#).unwrap();
        assert!(api.suppress_map_client_errors);
        assert!(!api.suppress_infer_binding_sources_for_parameters);

        let settings: MvcSettings = serde_json::from_str("{}").unwrap();
        assert!(settings.suppress_async_suffix_in_action_names);
    }
}
