//! Integration tests for waymark-config

use std::fs;
use std::path::PathBuf;
use waymark_config::*;

fn scratch_file(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("waymark-config-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_toml_file_then_env_file() {
    let toml = scratch_file(
        "waymark.toml",
        r#"
        [api]
        suppress_map_client_errors = true
        suppress_model_state_invalid_filter = true

        [mvc]
        suppress_async_suffix_in_action_names = false
        "#,
    );
    let dotenv = scratch_file("overrides.env", "WAYMARK_API__SUPPRESS_MAP_CLIENT_ERRORS=false\n");

    let settings = OptionsLoader::new().file(&toml).file(&dotenv).load().unwrap();
    assert!(!settings.api.suppress_map_client_errors);
    assert!(settings.api.suppress_model_state_invalid_filter);
    assert!(!settings.mvc.suppress_async_suffix_in_action_names);
}

#[test]
fn test_json_file() {
    let json = scratch_file(
        "waymark.json",
        r#"{"api": {"allow_inferring_binding_source_for_collection_types_as_from_query": true}}"#,
    );
    let settings = OptionsLoader::new().file(json).load().unwrap();
    assert!(settings.api.allow_inferring_binding_source_for_collection_types_as_from_query);
}

#[test]
fn test_dotenv_through_env_loader() {
    let dotenv = scratch_file(".env", "WAYMARK_MVC__SUPPRESS_ASYNC_SUFFIX_IN_ACTION_NAMES=false\n");
    let loader = EnvLoader::default().with_dotenv(dotenv);
    let settings = OptionsLoader::new().env(loader).load().unwrap();
    assert!(!settings.mvc.suppress_async_suffix_in_action_names);
}

#[test]
fn test_conflicting_flags_fail_validation() {
    let toml = scratch_file(
        "conflict.toml",
        "[api]\nsuppress_infer_binding_sources_for_parameters = true\nallow_inferring_binding_source_for_collection_types_as_from_query = true\n",
    );
    let err = OptionsLoader::new().file(toml).load().unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError { .. }));
}

#[test]
fn test_unsupported_extension() {
    let err = OptionsLoader::new().file("waymark.yaml").load().unwrap_err();
    assert!(err.to_string().contains("waymark.yaml"));
}

#[test]
fn test_missing_file() {
    let err = OptionsLoader::new().file("/nonexistent/waymark.json").load().unwrap_err();
    assert!(matches!(err, ConfigError::LoadError { .. }));
}
