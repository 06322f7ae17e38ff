// Environment variable loading
//
// `WAYMARK_API__SUPPRESS_MAP_CLIENT_ERRORS=true` becomes
// `{"api": {"suppress_map_client_errors": true}}`: the prefix is dropped,
// `__` separates sections and keys are lowercased.

use crate::{ConfigError, Result};
use serde_json::{Map, Value};
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_PREFIX: &str = "WAYMARK";

const SEPARATOR: &str = "__";

/// Environment variable loader
#[derive(Debug, Clone)]
pub struct EnvLoader {
    prefix: String,
    require_prefix: bool,
    dotenv: Option<PathBuf>,
}

impl EnvLoader {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            require_prefix: true,
            dotenv: None,
        }
    }

    /// Also accept keys without the prefix.
    pub fn optional_prefix(mut self) -> Self {
        self.require_prefix = false;
        self
    }

    /// Read a `.env` file underneath the process environment.
    pub fn with_dotenv(mut self, path: impl Into<PathBuf>) -> Self {
        self.dotenv = Some(path.into());
        self
    }

    /// Load the option tree. Process variables win over `.env` entries.
    pub fn load(&self) -> Result<Value> {
        let mut pairs = match &self.dotenv {
            Some(path) => read_dotenv(path)?,
            None => Vec::new(),
        };
        pairs.extend(env::vars());
        Ok(self.tree(pairs))
    }

    /// Load a single variable, `key` given without the prefix.
    pub fn load_var(&self, key: &str) -> Option<String> {
        env::var(format!("{}_{}", self.prefix, key.to_uppercase())).ok()
    }

    /// Build the option tree from raw pairs. Later pairs win.
    pub fn tree<I, K, V>(&self, pairs: I) -> Value
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut root = Map::new();
        for (key, value) in pairs {
            let Some(stripped) = self.strip_prefix(key.as_ref()) else {
                continue;
            };
            let path: Vec<String> = stripped
                .split(SEPARATOR)
                .filter(|s| !s.is_empty())
                .map(str::to_lowercase)
                .collect();
            if !path.is_empty() {
                insert_path(&mut root, &path, parse_scalar(value.as_ref()));
            }
        }
        Value::Object(root)
    }

    fn strip_prefix<'k>(&self, key: &'k str) -> Option<&'k str> {
        let prefixed = key
            .get(..self.prefix.len())
            .filter(|head| head.eq_ignore_ascii_case(&self.prefix))
            .and_then(|_| key[self.prefix.len()..].strip_prefix('_'));

        match prefixed {
            Some(rest) => Some(rest),
            None if !self.require_prefix => Some(key),
            None => None,
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

fn read_dotenv(path: &Path) -> Result<Vec<(String, String)>> {
    let load_error = |reason: String| ConfigError::LoadError {
        path: path.display().to_string(),
        reason,
    };

    let iter = dotenvy::from_path_iter(path).map_err(|e| load_error(e.to_string()))?;
    let mut pairs = Vec::new();
    for item in iter {
        pairs.push(item.map_err(|e| load_error(e.to_string()))?);
    }
    waymark_log::debug!("Read {} entries from {}", pairs.len(), path.display());
    Ok(pairs)
}

fn insert_path(map: &mut Map<String, Value>, path: &[String], value: Value) {
    let (last, sections) = match path.split_last() {
        Some(split) => split,
        None => return,
    };

    let mut current = map;
    for section in sections {
        let entry = current
            .entry(section.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(next) = entry else {
            return;
        };
        current = next;
    }
    current.insert(last.clone(), value);
}

/// Booleans and integers are typed, everything else stays a string.
fn parse_scalar(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Value::Bool(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Value::Bool(false)
    } else if let Ok(n) = trimmed.parse::<i64>() {
        Value::from(n)
    } else {
        Value::String(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_required_by_default() {
        let loader = EnvLoader::default();
        let tree = loader.tree([
            ("WAYMARK_API__SUPPRESS_MAP_CLIENT_ERRORS", "true"),
            ("PATH", "/usr/bin"),
            ("WAYMARKER_MVC__X", "1"),
        ]);
        assert_eq!(tree, serde_json::json!({"api": {"suppress_map_client_errors": true}}));
    }

    #[test]
    fn test_optional_prefix() {
        let loader = EnvLoader::default().optional_prefix();
        let tree = loader.tree([("MVC__SUPPRESS_ASYNC_SUFFIX_IN_ACTION_NAMES", "FALSE")]);
        assert_eq!(tree["mvc"]["suppress_async_suffix_in_action_names"], false);
    }

    #[test]
    fn test_later_pairs_win() {
        let loader = EnvLoader::default();
        let tree = loader.tree([("waymark_api__flag", "false"), ("WAYMARK_API__FLAG", "true")]);
        assert_eq!(tree["api"]["flag"], true);
    }

    #[test]
    fn test_scalar_parsing() {
        assert_eq!(parse_scalar("42"), Value::from(42));
        assert_eq!(parse_scalar(" True "), Value::Bool(true));
        assert_eq!(parse_scalar("api/v1"), Value::String("api/v1".into()));
    }

    #[test]
    fn test_missing_dotenv_is_a_load_error() {
        let loader = EnvLoader::default().with_dotenv("/nonexistent/waymark/.env");
        assert!(matches!(loader.load(), Err(ConfigError::LoadError { .. })));
    }

    #[test]
    fn test_load_var_missing() {
        let loader = EnvLoader::new("WAYMARK_TEST_NOPE");
        assert!(loader.load_var("MISSING_VAR_67890").is_none());
    }
}
