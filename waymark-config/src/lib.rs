// Option loading for the Waymark action model
//
// Options come in layers: files (JSON, TOML or .env), the process
// environment under the `WAYMARK_` prefix, or literal trees. Layers merge
// in order, then the result is checked for unknown keys, deserialized into
// the core option types and validated.

pub mod env;
pub mod error;
pub mod loader;
pub mod options;
pub mod validation;

pub use env::{DEFAULT_PREFIX, EnvLoader};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use options::{OptionsLoader, WaymarkSettings, merge};
pub use validation::{ConfigValidator, Validate};

/// Options from the `WAYMARK_` environment only.
pub fn from_env() -> Result<WaymarkSettings> {
    OptionsLoader::new().env(EnvLoader::default()).load()
}

/// Options from `path`, overridden by the `WAYMARK_` environment.
pub fn from_file_and_env(path: impl Into<std::path::PathBuf>) -> Result<WaymarkSettings> {
    OptionsLoader::new()
        .file(path)
        .env(EnvLoader::default())
        .load()
}
