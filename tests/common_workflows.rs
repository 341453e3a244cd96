//! Workflows spanning settings, templating and rendering.

use async_trait::async_trait;
use mailsmith::prelude::*;
use mailsmith::{Invocation, MjmlCompiler, MjmlError, ProcessRunner};
use serde_json::json;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Records invocations and answers with a fixed document.
#[derive(Default)]
struct RecordingRunner {
    calls: Mutex<Vec<Invocation>>,
}

#[async_trait]
impl ProcessRunner for RecordingRunner {
    async fn run(&self, invocation: Invocation) -> Result<String, MjmlError> {
        self.calls.lock().unwrap().push(invocation);
        Ok("<html></html>".to_string())
    }
}

#[tokio::test]
async fn test_settings_written_by_one_renderer_apply_to_the_next_call() {
    let store = MemoryStore::new();
    let runner = Arc::new(RecordingRunner::default());
    let renderer = MjmlRenderer::new(Arc::new(store.clone())).with_runner(runner.clone());
    let request = RenderRequest::new("<mjml></mjml>", "/mail/team/a.mjml").with_mjml_path("mjml");

    renderer.render(request.clone()).await;

    Settings {
        mjml: mailsmith_config::MjmlSettings {
            use_mjml_config: true,
            mjml_config_path: None,
        },
    }
    .save(&store)
    .await
    .unwrap();

    renderer.render(request).await;

    let calls = runner.calls.lock().unwrap();
    assert!(!calls[0].has_arg("--config.mjmlConfigPath=/mail/team"));
    assert!(calls[1].has_arg("--config.mjmlConfigPath=/mail/team"));
}

#[tokio::test]
async fn test_custom_partials_reach_the_compiler() {
    let templates = HandlebarsEngine::new(HandlebarsConfig::default()).unwrap();
    templates
        .register_partial("footer", "<mj-text>Sent by {{team}}</mj-text>")
        .unwrap();

    let dir = TempDir::new().unwrap();
    let result = MjmlRenderer::new(Arc::new(MemoryStore::new()))
        .with_templates(templates)
        .render(RenderRequest::new(
            "<mj-section><mj-column>{{> footer}}</mj-column></mj-section>",
            dir.path().join("a.mjml"),
        ))
        .await;

    assert!(result.html.contains("Sent by"));
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn test_concurrent_renders_are_independent() {
    let dir = TempDir::new().unwrap();
    let renderer = MjmlRenderer::new(Arc::new(MemoryStore::new()));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let renderer = renderer.clone();
            let path: PathBuf = dir.path().join(format!("t{i}.mjml"));
            tokio::spawn(async move {
                renderer
                    .render(RenderRequest::new(
                        format!(
                            "<mj-section><mj-column><mj-text>Copy {i}</mj-text></mj-column></mj-section>"
                        ),
                        path,
                    ))
                    .await
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.await.unwrap();
        assert!(result.html.contains(&format!("Copy {i}")));
    }
}

#[test]
fn test_migrated_markup_compiles() {
    let legacy = r#"<mjml><mj-body><mj-container><mj-section><mj-column><mj-text font-size="14">Legacy</mj-text></mj-column></mj-section></mj-container></mj-body></mjml>"#;
    let migrated = migrate_to_mjml4(legacy);
    assert!(!migrated.contains("mj-container"));

    let output = mailsmith::MrmlCompiler.compile(&migrated, &mailsmith::CompileOptions::default());
    assert!(output.html.contains("Legacy"));
    assert!(output.errors.is_empty());
}

#[test]
fn test_json_payload_shape() {
    let result = RenderResult {
        html: "<p/>".to_string(),
        errors: vec![MjmlDiagnostic::new("oops").with_line(3)],
    };
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({
            "html": "<p/>",
            "errors": [{
                "line": 3,
                "message": "oops",
                "tagName": null,
                "formattedMessage": "Line 3: oops"
            }]
        })
    );
}
