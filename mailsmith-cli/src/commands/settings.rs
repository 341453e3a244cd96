//! `mailsmith settings`: inspect and change the stored render settings.

use colored::Colorize;
use mailsmith_config::{Settings, SettingsStore, import_settings};
use std::path::{Path, PathBuf};

use crate::error::CliResult;
use crate::output;

/// Print the current settings.
pub async fn show(store: &dyn SettingsStore, location: &Path) -> CliResult<()> {
    let settings = Settings::load(store).await?;

    println!("{} {}", "Settings directory:".bright_cyan().bold(), location.display());
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

/// Enable or disable `.mjmlconfig` lookup.
pub async fn set_use_config(store: &dyn SettingsStore, enabled: bool) -> CliResult<()> {
    let mut settings = Settings::load(store).await?;
    settings.mjml.use_mjml_config = enabled;
    settings.save(store).await?;

    output::success(if enabled {
        "External MJML config enabled"
    } else {
        "External MJML config disabled"
    });
    Ok(())
}

/// Set or clear the explicit config location.
pub async fn set_config_path(store: &dyn SettingsStore, path: Option<PathBuf>) -> CliResult<()> {
    let mut settings = Settings::load(store).await?;

    match &path {
        Some(p) => output::success(&format!("MJML config path set to {}", p.display())),
        None => output::success("MJML config path cleared; templates use their own directory"),
    }
    if path.is_some() && !settings.mjml.use_mjml_config {
        output::warn("External MJML config is disabled; enable it with `settings set-config true`");
    }

    settings.mjml.mjml_config_path = path;
    settings.save(store).await?;
    Ok(())
}

/// Merge a JSON or TOML settings file into the store.
pub async fn import(store: &dyn SettingsStore, file: &Path) -> CliResult<()> {
    let settings = import_settings(store, file).await?;
    output::success(&format!(
        "Imported {} (useMjmlConfig: {})",
        file.display(),
        settings.mjml.use_mjml_config
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailsmith_config::MemoryStore;

    #[tokio::test]
    async fn test_toggle_and_path() {
        let store = MemoryStore::new();

        set_use_config(&store, true).await.unwrap();
        set_config_path(&store, Some(PathBuf::from("/etc/mjml"))).await.unwrap();

        let settings = Settings::load(&store).await.unwrap();
        assert!(settings.mjml.use_mjml_config);
        assert_eq!(settings.mjml.mjml_config_path, Some(PathBuf::from("/etc/mjml")));

        set_config_path(&store, None).await.unwrap();
        let settings = Settings::load(&store).await.unwrap();
        assert!(settings.mjml.use_mjml_config);
        assert_eq!(settings.mjml.mjml_config_path, None);
    }

    #[tokio::test]
    async fn test_import_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("settings.toml");
        std::fs::write(&file, "[mjml]\nuseMjmlConfig = true\n").unwrap();

        let store = MemoryStore::new();
        import(&store, &file).await.unwrap();
        assert!(Settings::load(&store).await.unwrap().mjml.use_mjml_config);
    }
}
