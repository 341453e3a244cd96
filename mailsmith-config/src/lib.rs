// Settings storage for Mailsmith
//
// A small async key-value store in the spirit of desktop JSON storage: each
// key maps to one JSON document. The renderer reads the `settings` document
// fresh on every call, so stores are injected rather than global.

pub mod error;
pub mod loader;
pub mod settings;
pub mod store;

pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use settings::{MjmlSettings, SETTINGS_KEY, Settings};
pub use store::{JsonFileStore, MemoryStore, SettingsStore};

use std::path::Path;

/// Import a settings file (JSON or TOML) into `store` under [`SETTINGS_KEY`].
///
/// The imported document replaces the stored one.
pub async fn import_settings(
    store: &dyn SettingsStore,
    path: impl AsRef<Path>,
) -> Result<Settings> {
    let path = path.as_ref();
    let value = ConfigLoader::auto(path)?.load_file(path).await?;

    if !value.is_object() {
        return Err(ConfigError::ParseError(format!(
            "{}: settings must be a table/object",
            path.display()
        )));
    }

    let settings = Settings::from_value(&value);
    store.set(SETTINGS_KEY, value).await?;
    tracing::info!(path = %path.display(), "Imported settings");

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_import_toml() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("settings.toml");
        std::fs::write(&file, "[mjml]\nuseMjmlConfig = true\n").unwrap();

        let store = MemoryStore::new();
        let settings = import_settings(&store, &file).await.unwrap();

        assert!(settings.mjml.use_mjml_config);
        assert!(store.get(SETTINGS_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_import_rejects_scalar() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("settings.json");
        std::fs::write(&file, "42").unwrap();

        let store = MemoryStore::new();
        assert!(import_settings(&store, &file).await.is_err());
        assert!(store.get(SETTINGS_KEY).await.unwrap().is_none());
    }
}
