//! `mailsmith migrate`

use crate::commands::write_output;
use crate::error::CliResult;
use crate::output;
use mailsmith_mjml::Migrator;
use std::path::Path;

/// Convert an MJML 3 template to MJML 4.
///
/// Unlike the library helper, parse failures are reported instead of
/// passing the input through.
pub async fn run(file: &Path, out: Option<&Path>, in_place: bool) -> CliResult<()> {
    let content = tokio::fs::read_to_string(file).await?;
    let migrated = Migrator::new().migrate(&content)?;

    let target = if in_place { Some(file) } else { out };
    write_output(target, &migrated).await?;

    if let Some(path) = target {
        output::success(&format!("Migrated {}", path.display()));
    }
    Ok(())
}
