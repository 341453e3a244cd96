//! Terminal status output.
//!
//! Status lines go to stderr so rendered HTML on stdout stays clean.

use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};

static QUIET: AtomicBool = AtomicBool::new(false);

/// Suppress everything except errors.
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

fn quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

pub fn success(msg: &str) {
    if !quiet() {
        eprintln!("  {} {}", "✓".green().bold(), msg.green());
    }
}

pub fn warn(msg: &str) {
    if !quiet() {
        eprintln!("  {} {}", "⚠".yellow().bold(), msg.yellow());
    }
}

pub fn info(msg: &str) {
    if !quiet() {
        eprintln!("  {} {}", "→".cyan(), msg);
    }
}

pub fn error(msg: &str) {
    eprintln!("  {} {}", "✗".red().bold(), msg);
}
