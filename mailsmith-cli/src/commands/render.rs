//! `mailsmith render`

use crate::commands::write_output;
use crate::error::{CliError, CliResult};
use crate::output;
use mailsmith_config::SettingsStore;
use mailsmith_mjml::{MjmlRenderer, RenderRequest, RenderResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Options shared by `render` and `watch`.
#[derive(Debug, Clone, Default)]
pub struct RenderSettings {
    pub mjml_path: Option<PathBuf>,
    pub minify: bool,
    pub output: Option<PathBuf>,
}

/// Render a template file and write the HTML.
pub async fn run(
    store: Arc<dyn SettingsStore>,
    file: &Path,
    settings: &RenderSettings,
    json: bool,
) -> CliResult<()> {
    let renderer = MjmlRenderer::new(store);
    let result = render_file(&renderer, file, settings).await?;
    report(&result);

    if json {
        let document = serde_json::to_string_pretty(&result)?;
        return write_output(settings.output.as_deref(), &document).await;
    }

    emit(&result, settings.output.as_deref()).await
}

/// Read `file` and render it.
pub async fn render_file(
    renderer: &MjmlRenderer,
    file: &Path,
    settings: &RenderSettings,
) -> CliResult<RenderResult> {
    let content = tokio::fs::read_to_string(file).await?;

    let mut request = RenderRequest::new(content, file).minify(settings.minify);
    request.mjml_path = settings.mjml_path.clone();

    Ok(renderer.render(request).await)
}

/// Print compiler diagnostics.
pub fn report(result: &RenderResult) {
    for diagnostic in &result.errors {
        output::warn(&diagnostic.formatted_message);
    }
}

/// Write the HTML of a successful render.
pub async fn emit(result: &RenderResult, out: Option<&Path>) -> CliResult<()> {
    if result.html.is_empty() {
        return Err(CliError::Render(match result.errors.len() {
            0 => "no output produced (run with --verbose for details)".to_string(),
            n => format!("{n} MJML error(s)"),
        }));
    }

    write_output(out, &result.html).await?;
    if let Some(path) = out {
        output::success(&format!("Wrote {}", path.display()));
    }
    Ok(())
}
