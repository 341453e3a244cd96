//! Configuration for the Handlebars template engine

use std::path::PathBuf;

/// Configuration for the Handlebars template engine
#[derive(Debug, Clone)]
pub struct HandlebarsConfig {
    /// Directory of partial templates, registered by relative path without extension
    pub partials_dir: Option<PathBuf>,

    /// Partial file extension (default: ".hbs")
    pub partial_extension: String,

    /// Enable strict mode (error on missing variables)
    pub strict_mode: bool,

    /// Enable HTML escaping of `{{value}}` (default: true)
    pub escape_html: bool,
}

impl HandlebarsConfig {
    /// Create a configuration with defaults: no partials, lenient, escaping on
    pub fn new() -> Self {
        Self {
            partials_dir: None,
            partial_extension: ".hbs".to_string(),
            strict_mode: false,
            escape_html: true,
        }
    }

    /// Set partials directory
    pub fn with_partials_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.partials_dir = Some(dir.into());
        self
    }

    /// Set partial file extension
    pub fn with_extension(mut self, ext: impl Into<String>) -> Self {
        self.partial_extension = ext.into();
        self
    }

    /// Enable strict mode (error on missing variables)
    pub fn with_strict_mode(mut self, enable: bool) -> Self {
        self.strict_mode = enable;
        self
    }

    /// Enable/disable HTML escaping
    pub fn with_escape_html(mut self, enable: bool) -> Self {
        self.escape_html = enable;
        self
    }
}

impl Default for HandlebarsConfig {
    fn default() -> Self {
        Self::new()
    }
}
