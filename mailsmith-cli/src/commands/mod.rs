//! CLI command implementations.

pub mod migrate;
pub mod render;
pub mod settings;
pub mod watch;

use crate::error::CliResult;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Write `content` to `path`, or to stdout when no path is given.
pub async fn write_output(path: Option<&Path>, content: &str) -> CliResult<()> {
    match path {
        Some(path) => tokio::fs::write(path, content).await?,
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(content.as_bytes()).await?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n").await?;
            }
            stdout.flush().await?;
        }
    }
    Ok(())
}
