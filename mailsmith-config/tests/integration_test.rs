//! Integration tests for mailsmith-config

use mailsmith_config::*;
use serde_json::json;
use std::path::PathBuf;
use tempfile::TempDir;

#[tokio::test]
async fn test_settings_survive_store_reopen() {
    let dir = TempDir::new().unwrap();

    let settings = Settings {
        mjml: MjmlSettings {
            use_mjml_config: true,
            mjml_config_path: Some(PathBuf::from("/srv/mjml")),
        },
    };
    settings.save(&JsonFileStore::new(dir.path())).await.unwrap();

    let reopened = JsonFileStore::new(dir.path());
    assert_eq!(Settings::load(&reopened).await.unwrap(), settings);
}

#[tokio::test]
async fn test_file_store_as_trait_object() {
    let dir = TempDir::new().unwrap();
    let store: Box<dyn SettingsStore> = Box::new(JsonFileStore::new(dir.path()));

    store.set("recent", json!(["a.mjml", "b.mjml"])).await.unwrap();
    store.set(SETTINGS_KEY, json!({})).await.unwrap();

    assert_eq!(
        store.keys().await.unwrap(),
        vec!["recent".to_string(), "settings".to_string()]
    );
}

#[tokio::test]
async fn test_import_json_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("import.json");
    std::fs::write(
        &file,
        r#"{"mjml": {"useMjmlConfig": true, "mjmlConfigPath": "/cfg"}}"#,
    )
    .unwrap();

    let store = JsonFileStore::new(dir.path().join("store"));
    let imported = import_settings(&store, &file).await.unwrap();

    assert_eq!(imported.mjml.mjml_config_path, Some(PathBuf::from("/cfg")));
    assert_eq!(Settings::load(&store).await.unwrap(), imported);
}

#[test]
fn test_config_error_display() {
    let err = ConfigError::ParseError("settings.json".to_string());
    let display = format!("{}", err);
    assert!(display.contains("settings.json"));
}
