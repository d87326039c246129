//! Unit tests for settings persistence.

use datachat::settings::{
    APP_SETTINGS_KEY, AppSettings, FileStore, KeyValueStore, LEGACY_API_KEY, SettingsService,
    default_settings_path,
};
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_default_path() {
    // Should return Some on most systems
    let path = default_settings_path();
    assert!(path.is_none() || path.unwrap().ends_with("datachat/settings.json"));
}

#[test]
fn test_file_store_round_trip() {
    let dir = tempdir().unwrap();
    let store = FileStore::new(dir.path().join("nested").join("settings.json"));

    assert_eq!(store.get("missing").unwrap(), None);
    store.set("a", "1").unwrap();
    store.set("b", "2").unwrap();
    assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));

    store.remove("a").unwrap();
    assert_eq!(store.get("a").unwrap(), None);
    assert!(store.path().exists());
}

#[test]
fn test_file_store_rejects_corrupt_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "[1, 2").unwrap();
    assert!(FileStore::new(path).get("a").is_err());
}

#[test]
fn test_settings_persist_across_services() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let first = SettingsService::new(Arc::new(FileStore::new(&path)));
    first.set_api_key("secret").unwrap();
    first.set_theme("dusk").unwrap();

    let second = SettingsService::new(Arc::new(FileStore::new(&path)));
    let settings = second.load().unwrap();
    assert_eq!(settings.api_key.as_deref(), Some("secret"));
    assert_eq!(settings.theme, "dusk");
    assert_eq!(settings.max_output_tokens, AppSettings::default().max_output_tokens);
}

#[test]
fn test_legacy_file_is_migrated() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{"gemini_api_key": "old-key", "dark_mode": "true"}"#).unwrap();

    let store = Arc::new(FileStore::new(&path));
    let service = SettingsService::new(store.clone());
    let settings = service.load().unwrap();

    assert_eq!(settings.api_key.as_deref(), Some("old-key"));
    assert!(settings.dark_mode);
    assert_eq!(store.get(LEGACY_API_KEY).unwrap(), None);

    let on_disk: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk.as_object().unwrap().len(), 1);
    assert!(on_disk[APP_SETTINGS_KEY].as_str().unwrap().contains("old-key"));
}
