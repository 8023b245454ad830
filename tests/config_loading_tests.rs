// Config loading tests - testing AppConfig::load defaults and error handling
//
// Tests focused on configuration file loading and validation errors.

use content_strategist::config::{AppConfig, ConfigError};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

fn write_config(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("app.toml");
    fs::write(&path, content).expect("Failed to write config");
    path
}

#[test]
fn returns_error_when_file_not_found() {
    let result = AppConfig::load(Some(Path::new("/nonexistent/path/app.toml")));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn returns_parse_error_for_invalid_toml() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), "max_rounds = [");
    assert!(matches!(
        AppConfig::load(Some(&path)),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
fn rejects_unparsable_bind_address() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), "bind_addr = \"localhost\"");
    assert!(matches!(
        AppConfig::load(Some(&path)),
        Err(ConfigError::Invalid(ref msg)) if msg.contains("bind_addr")
    ));
}

#[test]
fn zero_session_ttl_disables_eviction() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
model = "gemini-1.5-pro"
max_rounds = 5
tool_timeout_secs = 5
session_ttl_secs = 0
"#,
    );

    let config = AppConfig::load(Some(&path)).expect("config loads");
    assert_eq!(config.model, "gemini-1.5-pro");
    assert_eq!(config.max_rounds, 5);
    assert_eq!(config.tool_timeout, Duration::from_secs(5));
    assert_eq!(config.session_ttl, None);
    assert_eq!(config.model_timeout, AppConfig::default().model_timeout);
}

#[test]
fn sample_config_in_repository_loads() {
    let config = AppConfig::load(Some(Path::new("config/app.toml"))).expect("sample config");
    assert!(config.max_rounds >= 1);
    assert!(!config.model.is_empty());
}
