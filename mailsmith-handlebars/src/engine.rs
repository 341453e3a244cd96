//! Handlebars template engine wrapper

use crate::{Result, config::HandlebarsConfig, error::HandlebarsError, helpers};
use handlebars::Handlebars;
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Handlebars template engine with the built-in helper set registered.
#[derive(Clone)]
pub struct HandlebarsEngine {
    handlebars: Arc<RwLock<Handlebars<'static>>>,
    config: HandlebarsConfig,
}

impl HandlebarsEngine {
    /// Create a new Handlebars engine with configuration
    pub fn new(config: HandlebarsConfig) -> Result<Self> {
        let mut handlebars = Handlebars::new();

        handlebars.set_strict_mode(config.strict_mode);

        if !config.escape_html {
            handlebars.register_escape_fn(handlebars::no_escape);
        }

        helpers::register_builtin_helpers(&mut handlebars);

        let engine = Self {
            handlebars: Arc::new(RwLock::new(handlebars)),
            config,
        };

        engine.load_partials()?;

        Ok(engine)
    }

    fn read(&self) -> RwLockReadGuard<'_, Handlebars<'static>> {
        self.handlebars.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Handlebars<'static>> {
        self.handlebars.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load all partials from the configured directory
    fn load_partials(&self) -> Result<()> {
        let Some(ref dir) = self.config.partials_dir else {
            return Ok(());
        };

        if !dir.exists() {
            return Err(HandlebarsError::ConfigError(format!(
                "Partials directory not found: {:?}",
                dir
            )));
        }

        self.load_partials_from_dir(dir, dir)
    }

    /// Load partials from a directory recursively
    fn load_partials_from_dir(&self, root: &Path, dir: &Path) -> Result<()> {
        use std::fs;

        let wanted = self.config.partial_extension.trim_start_matches('.');

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();

            if path.is_dir() {
                self.load_partials_from_dir(root, &path)?;
            } else if path.extension().is_some_and(|ext| ext == wanted) {
                let name = path
                    .strip_prefix(root)
                    .unwrap_or(&path)
                    .with_extension("")
                    .to_string_lossy()
                    .replace('\\', "/");

                let content = fs::read_to_string(&path)?;
                self.write().register_partial(&name, content)?;
                debug!(partial = %name, "Registered partial");
            }
        }

        Ok(())
    }

    /// Compile `template_str` and render it against `data` in one step
    pub fn render_template<T: Serialize>(&self, template_str: &str, data: &T) -> Result<String> {
        self.read()
            .render_template(template_str, data)
            .map_err(HandlebarsError::from)
    }

    /// Register a partial
    pub fn register_partial(&self, name: &str, template: &str) -> Result<()> {
        self.write()
            .register_partial(name, template)
            .map_err(HandlebarsError::from)
    }

    /// Register a custom helper
    pub fn register_helper<F>(&self, name: &str, helper: F)
    where
        F: handlebars::HelperDef + Send + Sync + 'static,
    {
        self.write().register_helper(name, Box::new(helper));
    }

    /// Get configuration
    pub fn config(&self) -> &HandlebarsConfig {
        &self.config
    }
}

impl std::fmt::Debug for HandlebarsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlebarsEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
