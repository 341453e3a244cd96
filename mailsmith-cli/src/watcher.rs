//! File watching helpers for `mailsmith watch`.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Watch configuration.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Files whose changes trigger a render.
    pub files: Vec<PathBuf>,
    /// Debounce duration in milliseconds.
    pub debounce_ms: u64,
}

impl WatchConfig {
    /// Watch a template and its companion script.
    pub fn for_template(template: &Path, companion_extension: &str) -> Self {
        Self {
            files: vec![
                template.to_path_buf(),
                template.with_extension(companion_extension),
            ],
            debounce_ms: 300,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Directories to register with the watcher.
    ///
    /// Editors often replace files instead of writing them, so the parent
    /// directory is watched rather than the file itself.
    pub fn directories(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self
            .files
            .iter()
            .map(|f| match f.parent() {
                Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
                _ => PathBuf::from("."),
            })
            .collect();
        dirs.sort();
        dirs.dedup();
        dirs
    }

    /// Check if a changed path is one of the watched files.
    pub fn is_watched(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f == path)
    }
}
