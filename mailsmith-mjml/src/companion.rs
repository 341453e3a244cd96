//! Companion data scripts.
//!
//! A template `welcome.mjml` may sit next to `welcome.js`; the script's
//! JSON output becomes the data the template is rendered against.

use crate::config::RendererConfig;
use crate::process::{Invocation, ProcessRunner};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The script that provides data for `file_path`.
pub fn companion_script_path(file_path: &Path, extension: &str) -> PathBuf {
    file_path.with_extension(extension)
}

/// Run the companion script of `file_path` and parse its output.
///
/// Yields an empty object when the script is missing, fails, or prints
/// something that is not JSON.
pub async fn load_companion_data(
    runner: &dyn ProcessRunner,
    config: &RendererConfig,
    file_path: &Path,
) -> Value {
    let script = companion_script_path(file_path, &config.companion_extension);

    if !tokio::fs::try_exists(&script).await.unwrap_or(false) {
        debug!(script = %script.display(), "No companion script");
        return empty_context();
    }

    let invocation = Invocation::new(&config.script_interpreter)
        .arg(&script)
        .max_buffer(config.companion_max_buffer);

    let stdout = match runner.run(invocation).await {
        Ok(stdout) => stdout,
        Err(e) => {
            warn!(script = %script.display(), error = %e, "Companion script failed");
            return empty_context();
        }
    };

    match serde_json::from_str(&stdout) {
        Ok(data) => data,
        Err(e) => {
            warn!(script = %script.display(), error = %e, "Companion script printed invalid JSON");
            empty_context()
        }
    }
}

fn empty_context() -> Value {
    Value::Object(serde_json::Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MjmlError, Result};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct ScriptedRunner {
        reply: std::result::Result<String, i32>,
        calls: Mutex<Vec<Invocation>>,
    }

    impl ScriptedRunner {
        fn new(reply: std::result::Result<&str, i32>) -> Self {
            Self {
                reply: reply.map(str::to_string),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ProcessRunner for ScriptedRunner {
        async fn run(&self, invocation: Invocation) -> Result<String> {
            let program = invocation.program_name();
            self.calls.lock().unwrap().push(invocation);
            match &self.reply {
                Ok(out) => Ok(out.clone()),
                Err(code) => Err(MjmlError::ProcessFailed {
                    program,
                    status: Some(*code),
                    stderr: "ReferenceError".to_string(),
                }),
            }
        }
    }

    fn template_with_script(dir: &TempDir) -> PathBuf {
        let template = dir.path().join("welcome.mjml");
        std::fs::write(dir.path().join("welcome.js"), "console.log('{}')").unwrap();
        template
    }

    #[test]
    fn test_script_path() {
        assert_eq!(
            companion_script_path(Path::new("/mail/welcome.mjml"), "js"),
            PathBuf::from("/mail/welcome.js")
        );
        assert_eq!(
            companion_script_path(Path::new("/mail/welcome"), "js"),
            PathBuf::from("/mail/welcome.js")
        );
    }

    #[tokio::test]
    async fn test_parses_script_output() {
        let dir = TempDir::new().unwrap();
        let template = template_with_script(&dir);
        let runner = ScriptedRunner::new(Ok(r#"{"name": "Ada"}"#));

        let data = load_companion_data(&runner, &RendererConfig::default(), &template).await;
        assert_eq!(data, json!({"name": "Ada"}));

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, PathBuf::from("node"));
        assert_eq!(calls[0].args, vec![dir.path().join("welcome.js").into_os_string()]);
        assert_eq!(calls[0].max_buffer, crate::COMPANION_MAX_BUFFER);
        assert!(calls[0].stdin.is_none());
    }

    #[tokio::test]
    async fn test_missing_script_skips_runner() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::new(Ok("{}"));

        let config = RendererConfig::default();
        let data = load_companion_data(&runner, &config, &dir.path().join("a.mjml")).await;
        assert_eq!(data, json!({}));
        assert!(runner.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failing_script_yields_empty_object() {
        let dir = TempDir::new().unwrap();
        let template = template_with_script(&dir);
        let runner = ScriptedRunner::new(Err(1));

        let data = load_companion_data(&runner, &RendererConfig::default(), &template).await;
        assert_eq!(data, json!({}));
    }

    #[tokio::test]
    async fn test_invalid_json_yields_empty_object() {
        let dir = TempDir::new().unwrap();
        let template = template_with_script(&dir);
        let runner = ScriptedRunner::new(Ok("Hello, not JSON"));

        let data = load_companion_data(&runner, &RendererConfig::default(), &template).await;
        assert_eq!(data, json!({}));
    }
}
