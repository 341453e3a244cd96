// Renderer configuration

use crate::process::{COMPANION_MAX_BUFFER, EXTERNAL_MAX_BUFFER};
use mailsmith_config::{MjmlSettings, SETTINGS_KEY};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Prefix of the flag that points the `mjml` binary at a config location.
pub const CONFIG_PATH_FLAG: &str = "--config.mjmlConfigPath=";

/// Configuration for [`MjmlRenderer`](crate::MjmlRenderer)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererConfig {
    /// Interpreter used to run companion data scripts
    pub script_interpreter: PathBuf,

    /// Extension of the companion script next to a template
    pub companion_extension: String,

    /// Output limit for the external `mjml` binary
    pub external_max_buffer: usize,

    /// Output limit for companion scripts
    pub companion_max_buffer: usize,

    /// Store key holding the settings document
    pub settings_key: String,
}

impl RendererConfig {
    pub fn new() -> Self {
        Self {
            script_interpreter: PathBuf::from("node"),
            companion_extension: "js".to_string(),
            external_max_buffer: EXTERNAL_MAX_BUFFER,
            companion_max_buffer: COMPANION_MAX_BUFFER,
            settings_key: SETTINGS_KEY.to_string(),
        }
    }

    /// Set the companion script interpreter
    pub fn with_script_interpreter(mut self, interpreter: impl Into<PathBuf>) -> Self {
        self.script_interpreter = interpreter.into();
        self
    }

    /// Set the companion script extension
    pub fn with_companion_extension(mut self, extension: impl Into<String>) -> Self {
        self.companion_extension = extension.into();
        self
    }

    pub fn with_external_max_buffer(mut self, bytes: usize) -> Self {
        self.external_max_buffer = bytes;
        self
    }

    pub fn with_companion_max_buffer(mut self, bytes: usize) -> Self {
        self.companion_max_buffer = bytes;
        self
    }

    pub fn with_settings_key(mut self, key: impl Into<String>) -> Self {
        self.settings_key = key.into();
        self
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Where MJML should look for its config, if anywhere.
///
/// An explicit path wins over the template's directory; nothing is
/// returned unless external configs are enabled.
pub fn resolve_config_path(settings: &MjmlSettings, file_path: &Path) -> Option<PathBuf> {
    if !settings.use_mjml_config {
        return None;
    }

    if let Some(explicit) = &settings.mjml_config_path {
        return Some(explicit.clone());
    }

    Some(match file_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    })
}

/// `--config.mjmlConfigPath=<path>` as a single argument.
pub fn config_flag(path: &Path) -> OsString {
    let mut flag = OsString::from(CONFIG_PATH_FLAG);
    flag.push(path.as_os_str());
    flag
}
