// Option validation

use crate::{ConfigError, Result};
use serde::Serialize;
use serde_json::Value;
use waymark_core::{ApiBehaviorOptions, MvcSettings};

/// Trait for validating loaded options
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

impl Validate for ApiBehaviorOptions {
    fn validate(&self) -> Result<()> {
        if self.suppress_infer_binding_sources_for_parameters
            && self.allow_inferring_binding_source_for_collection_types_as_from_query
        {
            return Err(ConfigError::validation(
                "api.allow_inferring_binding_source_for_collection_types_as_from_query",
                "has no effect while binding source inference is suppressed",
            ));
        }
        Ok(())
    }
}

impl Validate for MvcSettings {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

pub struct ConfigValidator;

impl ConfigValidator {
    /// Reject keys in `section` that `T` does not have.
    ///
    /// Options deserialize with defaults for anything missing, so a
    /// misspelt key would otherwise be dropped without a word.
    pub fn known_keys<T: Serialize + Default>(section: &str, value: &Value) -> Result<()> {
        let Some(given) = value.as_object() else {
            return Err(ConfigError::validation(section, "expected a table of options"));
        };

        let shape = serde_json::to_value(T::default())?;
        let known = shape.as_object();
        for key in given.keys() {
            if !known.is_some_and(|k| k.contains_key(key)) {
                return Err(ConfigError::UnknownKey {
                    section: section.to_string(),
                    key: key.clone(),
                });
            }
        }
        Ok(())
    }
}
