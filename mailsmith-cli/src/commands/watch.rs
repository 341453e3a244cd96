//! `mailsmith watch`: re-render on every change of a template or its
//! companion script.

use colored::Colorize;
use mailsmith_config::SettingsStore;
use mailsmith_mjml::MjmlRenderer;
use notify::RecursiveMode;
use notify_debouncer_mini::{DebounceEventResult, new_debouncer};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::commands::render::{RenderSettings, emit, render_file, report};
use crate::error::CliResult;
use crate::output;
use crate::watcher::WatchConfig;

/// Watch `file` until Ctrl+C.
pub async fn run(
    store: Arc<dyn SettingsStore>,
    file: &Path,
    settings: &RenderSettings,
) -> CliResult<()> {
    let template = tokio::fs::canonicalize(file).await?;
    let renderer = MjmlRenderer::new(store);
    let config = WatchConfig::for_template(&template, &renderer.config().companion_extension);

    let (tx, mut rx) = mpsc::unbounded_channel::<DebounceEventResult>();
    let mut debouncer = new_debouncer(config.debounce(), move |events: DebounceEventResult| {
        let _ = tx.send(events);
    })?;

    for dir in config.directories() {
        debouncer.watcher().watch(&dir, RecursiveMode::NonRecursive)?;
    }

    output::info(&format!("Watching {}", template.display().to_string().cyan()));
    output::info(&format!("Press {} to stop", "Ctrl+C".yellow()));

    render_and_emit(&renderer, &template, settings).await;

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some(Ok(events)) => {
                    if events.iter().any(|e| config.is_watched(&e.path)) {
                        output::info("Change detected, rendering...");
                        render_and_emit(&renderer, &template, settings).await;
                    }
                }
                Some(Err(e)) => output::warn(&format!("Watch error: {}", e)),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    output::info("Stopped watching");
    Ok(())
}

/// Render once, reporting failures without leaving the watch loop.
async fn render_and_emit(renderer: &MjmlRenderer, template: &Path, settings: &RenderSettings) {
    let outcome = match render_file(renderer, template, settings).await {
        Ok(result) => {
            report(&result);
            emit(&result, settings.output.as_deref()).await
        }
        Err(e) => Err(e),
    };

    if let Err(e) = outcome {
        output::error(&e.to_string());
    }
}
