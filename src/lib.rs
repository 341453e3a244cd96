// Mailsmith - MJML email rendering for Rust
//
// Renders MJML templates through an external `mjml` binary or the built-in
// compiler, with Handlebars companion data and persistent settings.

// Re-export the renderer
pub use mailsmith_mjml::*;

// Re-export member crates
pub use mailsmith_config;
pub use mailsmith_handlebars;
pub use mailsmith_mjml;

#[cfg(feature = "log")]
pub use mailsmith_log;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        MjmlDiagnostic, MjmlRenderer, RenderOptions, RenderRequest, RenderResult, RendererConfig,
        migrate_to_mjml4, render, wrap_into_mjml_tags,
    };
    pub use mailsmith_config::{JsonFileStore, MemoryStore, Settings, SettingsStore};
    pub use mailsmith_handlebars::{HandlebarsConfig, HandlebarsEngine};
}
