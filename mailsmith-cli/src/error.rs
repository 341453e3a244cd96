//! Error types for the Mailsmith CLI.

use thiserror::Error;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types.
#[derive(Debug, Error)]
pub enum CliError {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings could not be read or written
    #[error("Settings error: {0}")]
    Settings(#[from] mailsmith_config::ConfigError),

    /// Rendering produced nothing usable
    #[error("Render error: {0}")]
    Render(String),

    /// Markup could not be migrated
    #[error("Migration error: {0}")]
    Migrate(#[from] mailsmith_mjml::MjmlError),

    /// Watch error
    #[error("Watch error: {0}")]
    Watch(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Output serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<notify::Error> for CliError {
    fn from(e: notify::Error) -> Self {
        CliError::Watch(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            CliError::Render("no output".to_string()).to_string(),
            "Render error: no output"
        );
        assert_eq!(
            CliError::InvalidArgument("x".to_string()).to_string(),
            "Invalid argument: x"
        );
    }

    #[test]
    fn test_from_io() {
        let err: CliError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, CliError::Io(_)));
    }
}
