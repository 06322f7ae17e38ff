// Layered option loading

use crate::env::EnvLoader;
use crate::loader::ConfigLoader;
use crate::validation::{ConfigValidator, Validate};
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use waymark_core::{ApiBehaviorOptions, MvcOptions, MvcSettings};

/// Everything the model builder reads from configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaymarkSettings {
    pub api: ApiBehaviorOptions,
    pub mvc: MvcSettings,
}

impl WaymarkSettings {
    /// `MvcOptions` carrying these settings and no filters or conventions.
    pub fn mvc_options(&self) -> MvcOptions {
        MvcOptions::new().with_settings(self.mvc.clone())
    }
}

impl Validate for WaymarkSettings {
    fn validate(&self) -> Result<()> {
        self.api.validate()?;
        self.mvc.validate()
    }
}

#[derive(Debug, Clone)]
enum Source {
    File(PathBuf),
    Env(EnvLoader),
    Value(Value),
}

/// Merges option sources in the order they were added; later sources win
/// key by key.
#[derive(Debug, Clone, Default)]
pub struct OptionsLoader {
    sources: Vec<Source>,
}

impl OptionsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// A file, format picked from its extension.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(Source::File(path.into()));
        self
    }

    pub fn env(mut self, loader: EnvLoader) -> Self {
        self.sources.push(Source::Env(loader));
        self
    }

    /// An already parsed tree.
    pub fn value(mut self, value: Value) -> Self {
        self.sources.push(Source::Value(value));
        self
    }

    pub fn load(&self) -> Result<WaymarkSettings> {
        let mut merged = Value::Object(Map::new());
        for source in &self.sources {
            let layer = match source {
                Source::File(path) => ConfigLoader::auto(path)?.load_file(path)?,
                Source::Env(loader) => loader.load()?,
                Source::Value(value) => value.clone(),
            };
            merge(&mut merged, layer);
        }

        if let Some(api) = merged.get("api") {
            ConfigValidator::known_keys::<ApiBehaviorOptions>("api", api)?;
        }
        if let Some(mvc) = merged.get("mvc") {
            ConfigValidator::known_keys::<MvcSettings>("mvc", mvc)?;
        }

        let settings: WaymarkSettings = serde_json::from_value(merged)?;
        settings.validate()?;

        waymark_log::info!("Loaded options from {} source(s)", self.sources.len());
        waymark_log::debug!("Options: {:?}", settings);
        Ok(settings)
    }
}

/// Deep merge `overlay` into `base`. Objects merge per key, anything else
/// replaces.
pub fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use serde_json::json;

    #[test]
    fn test_empty_loader_gives_defaults() {
        let settings = OptionsLoader::new().load().unwrap();
        assert_eq!(settings, WaymarkSettings::default());
        assert!(settings.mvc.suppress_async_suffix_in_action_names);
    }

    #[test]
    fn test_later_layers_win() {
        let settings = OptionsLoader::new()
            .value(json!({"api": {"suppress_map_client_errors": true, "suppress_model_state_invalid_filter": true}}))
            .value(json!({"api": {"suppress_map_client_errors": false}}))
            .load()
            .unwrap();
        assert!(!settings.api.suppress_map_client_errors);
        assert!(settings.api.suppress_model_state_invalid_filter);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = OptionsLoader::new()
            .value(json!({"mvc": {"suppress_async_suffix": false}}))
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey { .. }));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let err = OptionsLoader::new()
            .value(json!({"api": {"suppress_map_client_errors": "sometimes"}}))
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::DeserializationError(_)));
    }

    #[test]
    fn test_unrelated_top_level_keys_ignored() {
        let settings = OptionsLoader::new()
            .value(json!({"log_level": "debug", "mvc": {}}))
            .load()
            .unwrap();
        assert_eq!(settings, WaymarkSettings::default());
    }

    #[test]
    fn test_merge_replaces_scalars() {
        let mut base = json!({"a": {"b": 1, "c": 2}});
        merge(&mut base, json!({"a": {"b": 3}, "d": true}));
        assert_eq!(base, json!({"a": {"b": 3, "c": 2}, "d": true}));
    }

    #[test]
    fn test_mvc_options_carry_settings() {
        let settings = WaymarkSettings {
            mvc: MvcSettings {
                suppress_async_suffix_in_action_names: false,
            },
            ..Default::default()
        };
        assert!(!settings.mvc_options().settings.suppress_async_suffix_in_action_names);
    }
}
