//! MJML compilation.
//!
//! The renderer talks to a [`MjmlCompiler`]; [`MrmlCompiler`] is the
//! in-process implementation built on the `mrml` crate.

use crate::error::{MjmlError, Result};
use crate::request::MjmlDiagnostic;
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name MJML looks for inside a config directory.
pub const MJML_CONFIG_FILE: &str = ".mjmlconfig";

/// Options for a single compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub file_path: PathBuf,
    pub minify: bool,
    /// `.mjmlconfig` file, or a directory containing one
    pub mjml_config_path: Option<PathBuf>,
}

/// HTML and diagnostics produced by a compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOutput {
    pub html: String,
    pub errors: Vec<MjmlDiagnostic>,
}

/// Turns MJML markup into HTML. Compilation never fails outright: problems
/// are reported as diagnostics, with empty HTML when nothing could be built.
pub trait MjmlCompiler: Send + Sync {
    fn compile(&self, markup: &str, options: &CompileOptions) -> CompileOutput;
}

/// Contents of a `.mjmlconfig` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MjmlConfigFile {
    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default)]
    pub options: MjmlConfigOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MjmlConfigOptions {
    #[serde(default = "default_keep_comments")]
    pub keep_comments: bool,
    #[serde(default)]
    pub fonts: HashMap<String, String>,
}

fn default_keep_comments() -> bool {
    true
}

impl Default for MjmlConfigOptions {
    fn default() -> Self {
        Self {
            keep_comments: default_keep_comments(),
            fonts: HashMap::new(),
        }
    }
}

impl MjmlConfigFile {
    /// Load the config at `path`, which may name the file itself or the
    /// directory holding it. A missing file yields `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let file = if path.is_dir() {
            path.join(MJML_CONFIG_FILE)
        } else {
            path.to_path_buf()
        };

        if !file.is_file() {
            debug!(path = %file.display(), "No MJML config file");
            return Ok(None);
        }

        let content = std::fs::read_to_string(&file)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| MjmlError::Parse(format!("{}: {}", file.display(), e)))?;

        if !config.packages.is_empty() {
            warn!(
                path = %file.display(),
                packages = ?config.packages,
                "Custom MJML component packages are not supported and will be ignored"
            );
        }

        Ok(Some(config))
    }

    fn render_options(&self) -> mrml::prelude::render::RenderOptions {
        let mut options = mrml::prelude::render::RenderOptions {
            disable_comments: !self.options.keep_comments,
            ..Default::default()
        };
        for (name, url) in &self.options.fonts {
            options.fonts.insert(name.clone(), Cow::Owned(url.clone()));
        }
        options
    }
}

/// [`MjmlCompiler`] backed by `mrml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MrmlCompiler;

impl MrmlCompiler {
    pub fn new() -> Self {
        Self
    }

    fn render_options(options: &CompileOptions) -> mrml::prelude::render::RenderOptions {
        let Some(path) = &options.mjml_config_path else {
            return Default::default();
        };

        match MjmlConfigFile::load(path) {
            Ok(Some(config)) => config.render_options(),
            Ok(None) => Default::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable MJML config");
                Default::default()
            }
        }
    }
}

impl MjmlCompiler for MrmlCompiler {
    fn compile(&self, markup: &str, options: &CompileOptions) -> CompileOutput {
        let parsed = match mrml::parse(markup) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(file = %options.file_path.display(), error = %e, "MJML parse failed");
                return CompileOutput {
                    html: String::new(),
                    errors: vec![MjmlDiagnostic::new(e.to_string()).with_tag("mjml")],
                };
            }
        };

        let mut errors: Vec<MjmlDiagnostic> = parsed
            .warnings
            .iter()
            .map(|w| MjmlDiagnostic::new(w.to_string()))
            .collect();

        let html = match parsed.element.render(&Self::render_options(options)) {
            Ok(html) => html,
            Err(e) => {
                debug!(file = %options.file_path.display(), error = %e, "MJML render failed");
                errors.push(MjmlDiagnostic::new(e.to_string()).with_tag("mjml"));
                return CompileOutput {
                    html: String::new(),
                    errors,
                };
            }
        };

        let html = if options.minify { minify(&html) } else { html };

        CompileOutput { html, errors }
    }
}

/// Minify HTML while keeping what mail clients depend on: conditional
/// comments, closing tags and the doctype.
pub fn minify(html: &str) -> String {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_comments = true;
    cfg.keep_closing_tags = true;
    cfg.do_not_minify_doctype = true;

    let minified = minify_html::minify(html.as_bytes(), &cfg);
    String::from_utf8_lossy(&minified).into_owned()
}
