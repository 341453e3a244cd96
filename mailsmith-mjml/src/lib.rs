//! MJML rendering for Mailsmith
//!
//! Turns MJML templates into email-ready HTML, either through an external
//! `mjml` binary or with the in-process compiler.
//!
//! ## Features
//!
//! - Fragment wrapping: markup without an `<mjml>` root is wrapped into one
//! - External binary rendering with stdin or file-path invocation
//! - Companion data scripts (`welcome.js` next to `welcome.mjml`) feeding
//!   Handlebars templating before compilation
//! - `.mjmlconfig` discovery driven by stored settings
//! - MJML 3 to MJML 4 markup migration
//! - Failures never propagate: a render always resolves, with empty HTML
//!   when something went wrong
//!
//! ## Example
//!
//! ```no_run
//! use mailsmith_config::MemoryStore;
//! use mailsmith_mjml::{MjmlRenderer, RenderRequest};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let renderer = MjmlRenderer::new(Arc::new(MemoryStore::new()));
//! let result = renderer
//!     .render(RenderRequest::new("<mj-text>Hello</mj-text>", "mail/hello.mjml").minify(true))
//!     .await;
//!
//! for error in &result.errors {
//!     eprintln!("{error}");
//! }
//! println!("{}", result.html);
//! # }
//! ```

pub mod companion;
pub mod compiler;
pub mod config;
pub mod error;
pub mod migrate;
pub mod process;
pub mod renderer;
pub mod request;
pub mod wrap;

pub use compiler::{CompileOptions, CompileOutput, MjmlCompiler, MrmlCompiler};
pub use config::RendererConfig;
pub use error::{MjmlError, Result};
pub use migrate::{Migrator, migrate_to_mjml4};
pub use process::{
    COMPANION_MAX_BUFFER, EXTERNAL_MAX_BUFFER, Invocation, ProcessRunner, TokioProcessRunner,
};
pub use renderer::MjmlRenderer;
pub use request::{MjmlDiagnostic, RenderOptions, RenderRequest, RenderResult};
pub use wrap::wrap_into_mjml_tags;

use mailsmith_config::{JsonFileStore, MemoryStore, SettingsStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Render `content` with settings from the default settings directory.
///
/// Falls back to default settings when the platform has no config
/// directory. See [`MjmlRenderer::render`].
pub async fn render(
    content: impl Into<String>,
    file_path: impl Into<PathBuf>,
    mjml_path: Option<PathBuf>,
    options: RenderOptions,
) -> RenderResult {
    let request = build_request(content, file_path, mjml_path, options);
    MjmlRenderer::new(default_store()).render(request).await
}

fn default_store() -> Arc<dyn SettingsStore> {
    match JsonFileStore::default_location() {
        Ok(store) => Arc::new(store),
        Err(e) => {
            debug!(error = %e, "Using default settings");
            Arc::new(MemoryStore::new())
        }
    }
}

fn build_request(
    content: impl Into<String>,
    file_path: impl Into<PathBuf>,
    mjml_path: Option<PathBuf>,
    options: RenderOptions,
) -> RenderRequest {
    let mut request = RenderRequest::new(content, file_path).with_options(options);
    request.mjml_path = mjml_path;
    request
}
