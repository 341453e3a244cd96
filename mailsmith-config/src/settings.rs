//! Typed view over the `settings` document.

use crate::{ConfigError, Result, SettingsStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Key under which the settings document is stored.
pub const SETTINGS_KEY: &str = "settings";

/// User settings relevant to rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub mjml: MjmlSettings,
}

/// The `mjml` section of the settings document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MjmlSettings {
    /// Whether an external `.mjmlconfig` should be used
    #[serde(default)]
    pub use_mjml_config: bool,

    /// Explicit config location; the template's directory is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mjml_config_path: Option<PathBuf>,
}

impl Settings {
    /// Read settings from an untyped document.
    ///
    /// Missing or mistyped fields fall back to defaults, and booleans follow
    /// JSON truthiness so hand-edited files keep working. An empty config
    /// path counts as unset.
    pub fn from_value(value: &Value) -> Self {
        let use_mjml_config = value
            .pointer("/mjml/useMjmlConfig")
            .map(is_truthy)
            .unwrap_or(false);

        let mjml_config_path = value
            .pointer("/mjml/mjmlConfigPath")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Self {
            mjml: MjmlSettings {
                use_mjml_config,
                mjml_config_path,
            },
        }
    }

    /// Fetch the settings document from `store`.
    ///
    /// An absent document yields the defaults; store failures propagate.
    pub async fn load(store: &dyn SettingsStore) -> Result<Self> {
        Ok(store
            .get(SETTINGS_KEY)
            .await?
            .map(|value| Self::from_value(&value))
            .unwrap_or_default())
    }

    /// Write these settings back, keeping unrelated keys of the stored
    /// document intact.
    pub async fn save(&self, store: &dyn SettingsStore) -> Result<()> {
        let mut document = match store.get(SETTINGS_KEY).await? {
            Some(Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };

        let section = serde_json::to_value(&self.mjml)
            .map_err(|e| ConfigError::SerializationError(e.to_string()))?;

        match document.get_mut("mjml") {
            Some(Value::Object(existing)) => {
                existing.remove("mjmlConfigPath");
                if let Value::Object(fields) = section {
                    existing.extend(fields);
                }
            }
            _ => {
                document.insert("mjml".to_string(), section);
            }
        }

        store.set(SETTINGS_KEY, Value::Object(document)).await
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use serde_json::json;

    #[test]
    fn test_from_value_full() {
        let settings = Settings::from_value(&json!({
            "mjml": {"useMjmlConfig": true, "mjmlConfigPath": "/etc/mjml"}
        }));

        assert!(settings.mjml.use_mjml_config);
        assert_eq!(settings.mjml.mjml_config_path, Some(PathBuf::from("/etc/mjml")));
    }

    #[test]
    fn test_from_value_lenient() {
        let settings = Settings::from_value(&json!({
            "mjml": {"useMjmlConfig": "yes", "mjmlConfigPath": ""}
        }));
        assert!(settings.mjml.use_mjml_config);
        assert_eq!(settings.mjml.mjml_config_path, None);

        let settings = Settings::from_value(&json!({"mjml": {"useMjmlConfig": 0}}));
        assert!(!settings.mjml.use_mjml_config);

        assert_eq!(Settings::from_value(&json!("garbage")), Settings::default());
    }

    #[tokio::test]
    async fn test_load_missing_document() {
        let store = MemoryStore::new();
        let settings = Settings::load(&store).await.unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[tokio::test]
    async fn test_save_preserves_other_keys() {
        let store = MemoryStore::with_entry(
            SETTINGS_KEY,
            json!({"theme": "dark", "mjml": {"beautify": true, "mjmlConfigPath": "/old"}}),
        );

        let settings = Settings {
            mjml: MjmlSettings {
                use_mjml_config: true,
                mjml_config_path: None,
            },
        };
        settings.save(&store).await.unwrap();

        let stored = store.get(SETTINGS_KEY).await.unwrap().unwrap();
        assert_eq!(stored["theme"], "dark");
        assert_eq!(stored["mjml"]["beautify"], true);
        assert_eq!(stored["mjml"]["useMjmlConfig"], true);
        assert!(stored["mjml"].get("mjmlConfigPath").is_none());

        assert_eq!(Settings::load(&store).await.unwrap(), settings);
    }
}
