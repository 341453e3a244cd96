//! Render request and result types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Per-call rendering options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Minify the produced HTML
    #[serde(default)]
    pub minify: bool,
}

/// One render call's input.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    /// MJML markup, possibly a fragment without the `<mjml>` root
    pub mjml_content: String,
    /// Location of the template; drives config and companion script lookup
    pub file_path: PathBuf,
    /// External `mjml` binary to use instead of the built-in compiler
    pub mjml_path: Option<PathBuf>,
    pub options: RenderOptions,
}

impl RenderRequest {
    pub fn new(mjml_content: impl Into<String>, file_path: impl Into<PathBuf>) -> Self {
        Self {
            mjml_content: mjml_content.into(),
            file_path: file_path.into(),
            mjml_path: None,
            options: RenderOptions::default(),
        }
    }

    /// Render through an external `mjml` binary
    pub fn with_mjml_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.mjml_path = Some(path.into());
        self
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn minify(mut self, minify: bool) -> Self {
        self.options.minify = minify;
        self
    }
}

/// A diagnostic reported by the MJML compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MjmlDiagnostic {
    pub line: Option<usize>,
    pub message: String,
    pub tag_name: Option<String>,
    pub formatted_message: String,
}

impl MjmlDiagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            line: None,
            formatted_message: message.clone(),
            message,
            tag_name: None,
        }
    }

    pub fn with_tag(mut self, tag_name: impl Into<String>) -> Self {
        let tag_name = tag_name.into();
        self.formatted_message = match self.line {
            Some(line) => format!("Line {} of <{}>: {}", line, tag_name, self.message),
            None => format!("<{}>: {}", tag_name, self.message),
        };
        self.tag_name = Some(tag_name);
        self
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self.formatted_message = match &self.tag_name {
            Some(tag) => format!("Line {} of <{}>: {}", line, tag, self.message),
            None => format!("Line {}: {}", line, self.message),
        };
        self
    }
}

impl std::fmt::Display for MjmlDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.formatted_message)
    }
}

/// The outcome of a render call. Failures show up as empty HTML; only
/// compiler diagnostics are carried in `errors`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderResult {
    pub html: String,
    pub errors: Vec<MjmlDiagnostic>,
}

impl RenderResult {
    /// The result every failed render resolves to.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn html(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            errors: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.html.is_empty() && self.errors.is_empty()
    }
}
