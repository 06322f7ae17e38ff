// Option file loaders

use crate::env::{DEFAULT_PREFIX, EnvLoader};
use crate::{ConfigError, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Supported option file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
    Env,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            "env" => Some(FileFormat::Env),
            _ => None,
        }
    }

    /// Detect the format of `path`. A bare `.env` file has no extension
    /// as far as [`Path::extension`] is concerned, so it is matched by name.
    pub fn detect(path: &Path) -> Option<Self> {
        if path.file_name().and_then(|n| n.to_str()) == Some(".env") {
            return Some(FileFormat::Env);
        }
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Json => "JSON",
            FileFormat::Toml => "TOML",
            FileFormat::Env => "env",
        }
    }
}

/// Parses an option file into a JSON tree.
///
/// Every format ends up with the same shape: an object with optional
/// `api` and `mvc` sections.
pub struct ConfigLoader {
    format: FileFormat,
}

impl ConfigLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Auto-detect format from file extension
    pub fn auto(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        FileFormat::detect(path).map(Self::new).ok_or_else(|| ConfigError::LoadError {
            path: path.display().to_string(),
            reason: "unsupported or missing file extension".to_string(),
        })
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::LoadError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        waymark_log::debug!(
            "Read {} options from {}",
            self.format.as_str(),
            path.display()
        );
        self.parse(&content)
    }

    pub fn parse(&self, content: &str) -> Result<Value> {
        match self.format {
            FileFormat::Json => self.parse_json(content),
            FileFormat::Toml => self.parse_toml(content),
            FileFormat::Env => self.parse_env(content),
        }
    }

    fn parse_error(&self, message: impl ToString) -> ConfigError {
        ConfigError::ParseError {
            format: self.format.as_str(),
            message: message.to_string(),
        }
    }

    fn parse_json(&self, content: &str) -> Result<Value> {
        serde_json::from_str(content).map_err(|e| self.parse_error(e))
    }

    fn parse_toml(&self, content: &str) -> Result<Value> {
        let table: toml::Table = toml::from_str(content).map_err(|e| self.parse_error(e))?;
        serde_json::to_value(table).map_err(|e| self.parse_error(e))
    }

    // Same key scheme as the process environment, prefix optional.
    fn parse_env(&self, content: &str) -> Result<Value> {
        let mut pairs = Vec::new();
        for item in dotenvy::from_read_iter(content.as_bytes()) {
            pairs.push(item.map_err(|e| self.parse_error(e))?);
        }

        let loader = EnvLoader::new(DEFAULT_PREFIX).optional_prefix();
        Ok(loader.tree(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json() {
        let loader = ConfigLoader::new(FileFormat::Json);
        let result = loader
            .parse(r#"{"api": {"suppress_map_client_errors": true}}"#)
            .unwrap();
        assert_eq!(result["api"]["suppress_map_client_errors"], true);
    }

    #[test]
    fn test_parse_toml() {
        let loader = ConfigLoader::new(FileFormat::Toml);
        let toml = r#"
            [mvc]
            suppress_async_suffix_in_action_names = false
        "#;

        let result = loader.parse(toml).unwrap();
        assert_eq!(result["mvc"]["suppress_async_suffix_in_action_names"], false);
    }

    #[test]
    fn test_parse_env() {
        let loader = ConfigLoader::new(FileFormat::Env);
        let env = "# Comment\nWAYMARK_API__SUPPRESS_MAP_CLIENT_ERRORS=true\nMVC__SUPPRESS_ASYNC_SUFFIX_IN_ACTION_NAMES=\"false\"\n";

        let result = loader.parse(env).unwrap();
        assert_eq!(result["api"]["suppress_map_client_errors"], true);
        assert_eq!(result["mvc"]["suppress_async_suffix_in_action_names"], false);
    }

    #[test]
    fn test_parse_errors_name_the_format() {
        let err = ConfigLoader::new(FileFormat::Toml).parse("[mvc").unwrap_err();
        assert!(err.to_string().contains("TOML"));

        let err = ConfigLoader::new(FileFormat::Json).parse("{").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { format: "JSON", .. }));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_extension("json"), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_extension("TOML"), Some(FileFormat::Toml));
        assert_eq!(FileFormat::from_extension("unknown"), None);
        assert_eq!(FileFormat::detect(Path::new("conf/.env")), Some(FileFormat::Env));
        assert_eq!(FileFormat::detect(Path::new("waymark.toml")), Some(FileFormat::Toml));
        assert!(ConfigLoader::auto("waymark").is_err());
    }
}
