//! MJML rendering error types.

use thiserror::Error;

/// Result type for rendering internals.
pub type Result<T> = std::result::Result<T, MjmlError>;

/// Failures inside a render call.
///
/// These never escape [`MjmlRenderer::render`](crate::MjmlRenderer::render);
/// they are logged and turned into an empty result.
#[derive(Debug, Error)]
pub enum MjmlError {
    /// Settings could not be read.
    #[error("Settings error: {0}")]
    Settings(#[from] mailsmith_config::ConfigError),

    /// The program could not be started.
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program exited unsuccessfully.
    #[error("{program} exited with {}: {stderr}", describe_status(.status))]
    ProcessFailed {
        program: String,
        status: Option<i32>,
        stderr: String,
    },

    /// The program wrote more than the allowed amount of output.
    #[error("{program} produced more than {limit} bytes of output")]
    OutputTooLarge { program: String, limit: usize },

    /// Template error.
    #[error("Template error: {0}")]
    Template(#[from] mailsmith_handlebars::HandlebarsError),

    /// Markup could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A blocking task panicked or was cancelled.
    #[error("Render task failed: {0}")]
    Task(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "signal".to_string(),
    }
}

impl From<tokio::task::JoinError> for MjmlError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}

impl From<quick_xml::Error> for MjmlError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for MjmlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Parse(err.to_string())
    }
}
