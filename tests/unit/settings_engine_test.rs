//! Integration tests for the JSON-backed settings engine.

use std::fs;

use tempfile::TempDir;

use reviewbadge::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use reviewbadge::types::errors::SettingsError;
use reviewbadge::types::settings::{DisplayMode, Scope};

fn engine_in(dir: &TempDir) -> (SettingsEngine, String) {
    let path = dir.path().join("settings.json").to_string_lossy().to_string();
    let mut engine = SettingsEngine::new(Some(path.clone()));
    engine.load().unwrap();
    (engine, path)
}

#[test]
fn test_changes_persist_across_instances() {
    let dir = TempDir::new().unwrap();
    let (mut engine, path) = engine_in(&dir);

    assert!(engine.set_token("ghp_secret").unwrap());
    assert!(engine.set_username("Mona").unwrap());
    engine.set_display_mode(DisplayMode::Icon).unwrap();
    engine.set_scope(Scope::Everywhere).unwrap();

    let reopened = SettingsEngine::open(Some(path)).unwrap();
    let settings = reopened.get_settings();
    assert_eq!(settings.token, "ghp_secret");
    assert_eq!(settings.username, "mona");
    assert_eq!(settings.display_mode, DisplayMode::Icon);
    assert_eq!(settings.scope, Scope::Everywhere);
    assert!(settings.is_configured());
}

#[test]
fn test_file_uses_kebab_case_values() {
    let dir = TempDir::new().unwrap();
    let (mut engine, path) = engine_in(&dir);
    engine.set_scope(Scope::AllNotifications).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(raw["scope"], "all-notifications");
    assert_eq!(raw["display_mode"], "icon-text-color");
}

#[test]
fn test_partial_file_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{"username":"octocat"}"#).unwrap();

    let engine = SettingsEngine::open(Some(path.to_string_lossy().to_string())).unwrap();
    let settings = engine.get_settings();
    assert_eq!(settings.username, "octocat");
    assert_eq!(settings.token, "");
    assert_eq!(settings.scope, Scope::ReviewRequested);
    assert!(!settings.is_configured());
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "{ not json").unwrap();

    let result = SettingsEngine::open(Some(path.to_string_lossy().to_string()));
    assert!(matches!(result, Err(SettingsError::SerializationError(_))));
}

#[test]
fn test_unknown_enum_value_in_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{"scope":"galaxy"}"#).unwrap();

    assert!(SettingsEngine::open(Some(path.to_string_lossy().to_string())).is_err());
}

#[test]
fn test_save_creates_missing_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir
        .path()
        .join("nested")
        .join("deeper")
        .join("settings.json")
        .to_string_lossy()
        .to_string();
    let mut engine = SettingsEngine::new(Some(path.clone()));
    engine.set_scope(Scope::Everywhere).unwrap();
    assert!(std::path::Path::new(&path).exists());
}

#[test]
fn test_blank_username_keeps_previous_value() {
    let dir = TempDir::new().unwrap();
    let (mut engine, _) = engine_in(&dir);
    engine.set_username("hubot").unwrap();

    assert!(!engine.set_username("  \t").unwrap());
    assert_eq!(engine.get_settings().username, "hubot");
}

#[test]
fn test_set_value_persists_valid_change() {
    let dir = TempDir::new().unwrap();
    let (mut engine, path) = engine_in(&dir);
    engine
        .set_value("display_mode", serde_json::json!("icon-text"))
        .unwrap();

    let reopened = SettingsEngine::open(Some(path)).unwrap();
    assert_eq!(reopened.get_settings().display_mode, DisplayMode::IconText);
}

#[test]
fn test_config_path_override_is_reported() {
    let dir = TempDir::new().unwrap();
    let (engine, path) = engine_in(&dir);
    assert_eq!(engine.get_config_path(), path);
}

#[test]
fn test_default_path_lives_in_config_dir() {
    let dir = TempDir::new().unwrap();
    std::env::set_var(reviewbadge::platform::CONFIG_DIR_ENV, dir.path());
    let engine = SettingsEngine::new(None);
    std::env::remove_var(reviewbadge::platform::CONFIG_DIR_ENV);

    assert!(engine.get_config_path().ends_with("settings.json"));
    assert!(engine
        .get_config_path()
        .starts_with(dir.path().to_string_lossy().as_ref()));
}
