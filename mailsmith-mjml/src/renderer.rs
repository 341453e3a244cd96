// MJML renderer

use crate::companion::load_companion_data;
use crate::compiler::{CompileOptions, CompileOutput, MjmlCompiler, MrmlCompiler};
use crate::config::{RendererConfig, config_flag, resolve_config_path};
use crate::error::Result;
use crate::process::{Invocation, ProcessRunner, TokioProcessRunner};
use crate::request::{RenderRequest, RenderResult};
use crate::wrap::{needs_wrapping, wrap_into_mjml_tags};
use mailsmith_config::{Settings, SettingsStore};
use mailsmith_handlebars::HandlebarsEngine;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Flags passed to every external `mjml` invocation.
const COMMON_FLAGS: &[&str] = &["-s", "--config.validationLevel=skip"];

/// Renders MJML templates to HTML.
///
/// With a `mjml_path` on the request the external binary does the work;
/// otherwise the template is merged with its companion data and compiled
/// in process. Settings are read from the store on every call.
#[derive(Clone)]
pub struct MjmlRenderer {
    settings: Arc<dyn SettingsStore>,
    runner: Arc<dyn ProcessRunner>,
    compiler: Arc<dyn MjmlCompiler>,
    templates: HandlebarsEngine,
    config: RendererConfig,
}

impl MjmlRenderer {
    /// Create a renderer that reads its settings from `settings`
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            settings,
            runner: Arc::new(TokioProcessRunner::new()),
            compiler: Arc::new(MrmlCompiler::new()),
            templates: HandlebarsEngine::default(),
            config: RendererConfig::default(),
        }
    }

    /// Use a different process runner
    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Use a different MJML compiler
    pub fn with_compiler(mut self, compiler: Arc<dyn MjmlCompiler>) -> Self {
        self.compiler = compiler;
        self
    }

    /// Use a template engine with custom partials or helpers
    pub fn with_templates(mut self, templates: HandlebarsEngine) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_config(mut self, config: RendererConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn templates(&self) -> &HandlebarsEngine {
        &self.templates
    }

    /// Render a template.
    ///
    /// Never fails: anything that goes wrong is logged and yields an empty
    /// result. Only compiler diagnostics are reported back.
    pub async fn render(&self, request: RenderRequest) -> RenderResult {
        tokio::task::yield_now().await;

        match self.try_render(&request).await {
            Ok(result) => result,
            Err(e) => {
                warn!(file = %request.file_path.display(), error = %e, "MJML render failed");
                RenderResult::empty()
            }
        }
    }

    async fn try_render(&self, request: &RenderRequest) -> Result<RenderResult> {
        let settings = self.load_settings().await?;
        let config_path = resolve_config_path(&settings.mjml, &request.file_path);

        match &request.mjml_path {
            Some(binary) => self.render_external(binary, request, config_path).await,
            None => self.render_internal(request, config_path).await,
        }
    }

    async fn load_settings(&self) -> Result<Settings> {
        Ok(self
            .settings
            .get(&self.config.settings_key)
            .await?
            .map(|value| Settings::from_value(&value))
            .unwrap_or_default())
    }

    async fn render_external(
        &self,
        binary: &Path,
        request: &RenderRequest,
        config_path: Option<PathBuf>,
    ) -> Result<RenderResult> {
        let mut flags: Vec<OsString> = COMMON_FLAGS.iter().map(OsString::from).collect();
        if request.options.minify {
            flags.push(OsString::from("-m"));
        }
        if let Some(path) = &config_path {
            flags.push(config_flag(path));
        }

        let invocation = if needs_wrapping(&request.mjml_content) {
            Invocation::new(binary)
                .args(flags)
                .arg("-i")
                .stdin(wrap_into_mjml_tags(&request.mjml_content))
        } else {
            Invocation::new(binary).arg(&request.file_path).args(flags)
        };

        debug!(
            binary = %binary.display(),
            file = %request.file_path.display(),
            "Rendering with external mjml"
        );
        let html = self
            .runner
            .run(invocation.max_buffer(self.config.external_max_buffer))
            .await?;

        Ok(RenderResult::html(html))
    }

    async fn render_internal(
        &self,
        request: &RenderRequest,
        config_path: Option<PathBuf>,
    ) -> Result<RenderResult> {
        let markup = if needs_wrapping(&request.mjml_content) {
            wrap_into_mjml_tags(&request.mjml_content)
        } else {
            request.mjml_content.clone()
        };

        let options = CompileOptions {
            file_path: request.file_path.clone(),
            minify: request.options.minify,
            mjml_config_path: config_path,
        };

        let data =
            load_companion_data(self.runner.as_ref(), &self.config, &request.file_path).await;

        let templates = self.templates.clone();
        let compiler = Arc::clone(&self.compiler);
        let output = tokio::task::spawn_blocking(move || -> Result<CompileOutput> {
            let markup = templates.render_template(&markup, &data)?;
            Ok(compiler.compile(&markup, &options))
        })
        .await??;

        debug!(
            file = %request.file_path.display(),
            bytes = output.html.len(),
            diagnostics = output.errors.len(),
            "Rendered MJML"
        );

        Ok(RenderResult {
            html: output.html,
            errors: output.errors,
        })
    }
}

impl std::fmt::Debug for MjmlRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MjmlRenderer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
