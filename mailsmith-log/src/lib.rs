//! Mailsmith Logging
//!
//! Installs a `tracing` subscriber configured from `MAILSMITH_*` environment
//! variables. Library crates in the workspace log through the `tracing`
//! macros; binaries call [`init`] once at startup.
//!
//! # Usage
//!
//! ```rust,no_run
//! mailsmith_log::init();
//! tracing::info!(file = "welcome.mjml", "Rendering template");
//! ```
//!
//! # Environment Variables
//!
//! - `MAILSMITH_DEBUG=1` - Enable debug logging
//! - `MAILSMITH_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `MAILSMITH_LOG_FORMAT=pretty|compact|json` - Set output format
//! - `MAILSMITH_LOG_COLOR=1|0` - Enable/disable colors
//! - `MAILSMITH_LOG_TIMESTAMPS=1|0` - Include timestamps
//!
//! `RUST_LOG`, when set, takes precedence over the level variables.

use once_cell::sync::Lazy;
use std::env;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

// ============================================================================
// Log Levels
// ============================================================================

/// Log level for Mailsmith logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    /// Trace level (most verbose)
    Trace = 0,
    /// Debug level
    Debug = 1,
    /// Info level
    Info = 2,
    /// Warning level
    Warn = 3,
    /// Error level (least verbose)
    Error = 4,
    /// Off (no logging)
    Off = 5,
}

impl Level {
    /// Get level from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" | "warning" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "off" | "none" => Some(Level::Off),
            _ => None,
        }
    }

    /// Directive understood by `EnvFilter`.
    pub fn as_directive(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Off => "off",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Warn,
            4 => Level::Error,
            _ => Level::Off,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_directive().to_uppercase())
    }
}

// ============================================================================
// Log Format
// ============================================================================

/// Output format for log messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Multi-line human readable format
    Pretty,
    /// Compact single-line format (default)
    Compact,
    /// JSON format for structured logging
    Json,
}

impl Format {
    /// Get format from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }

    /// The format actually written. JSON output needs the `json` feature and
    /// falls back to compact without it.
    pub fn effective(self) -> Self {
        match self {
            #[cfg(not(feature = "json"))]
            Format::Json => Format::Compact,
            other => other,
        }
    }
}

// ============================================================================
// Global Configuration
// ============================================================================

/// Level requested at runtime, overriding the environment.
static LEVEL_OVERRIDE: AtomicU8 = AtomicU8::new(u8::MAX);

/// Global configuration (lazy initialized).
static CONFIG: Lazy<LogConfig> = Lazy::new(LogConfig::from_env);

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether debug mode is enabled
    pub debug: bool,
    /// Minimum log level
    pub level: Level,
    /// Output format
    pub format: Format,
    /// Whether colors are enabled
    pub color: bool,
    /// Whether to include timestamps
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Warn,
            format: Format::Compact,
            color: false,
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let debug = env_flag("MAILSMITH_DEBUG").unwrap_or(false);

        let level = env::var("MAILSMITH_LOG_LEVEL")
            .ok()
            .and_then(|s| Level::parse(&s))
            .unwrap_or(if debug { Level::Debug } else { Level::Warn });

        let format = env::var("MAILSMITH_LOG_FORMAT")
            .ok()
            .and_then(|s| Format::parse(&s))
            .unwrap_or(Format::Compact);

        let color = env_flag("MAILSMITH_LOG_COLOR").unwrap_or_else(color_supported);
        let timestamps = env_flag("MAILSMITH_LOG_TIMESTAMPS").unwrap_or(true);

        Self {
            debug,
            level,
            format,
            color,
            timestamps,
        }
    }

    /// Build the `EnvFilter` for this configuration.
    ///
    /// `RUST_LOG` wins when it is set and parses.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_directive()))
    }

    fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let base = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(self.color)
            .with_target(true);

        match (self.format.effective(), self.timestamps) {
            (Format::Pretty, true) => base.pretty().boxed(),
            (Format::Pretty, false) => base.pretty().without_time().boxed(),
            #[cfg(feature = "json")]
            (Format::Json, true) => base.json().boxed(),
            #[cfg(feature = "json")]
            (Format::Json, false) => base.json().without_time().boxed(),
            (_, true) => base.compact().boxed(),
            (_, false) => base.compact().without_time().boxed(),
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

fn color_supported() -> bool {
    env::var("NO_COLOR").is_err() && env::var("TERM").is_ok()
}

// ============================================================================
// Public API
// ============================================================================

/// Install the global subscriber using the environment configuration.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init() {
    let _ = try_init();
}

/// Install the global subscriber, reporting whether one was already set.
pub fn try_init() -> Result<(), tracing_subscriber::util::TryInitError> {
    init_with(&effective_config())
}

/// Install the global subscriber for an explicit configuration.
pub fn init_with(config: &LogConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(config.fmt_layer())
        .with(config.env_filter())
        .try_init()
}

/// Get the configuration read from the environment.
pub fn config() -> &'static LogConfig {
    &CONFIG
}

/// Override the level before [`init`] runs (used by `--verbose`/`--quiet`).
pub fn set_level(level: Level) {
    LEVEL_OVERRIDE.store(level as u8, Ordering::SeqCst);
}

/// Current effective level.
pub fn current_level() -> Level {
    match LEVEL_OVERRIDE.load(Ordering::SeqCst) {
        u8::MAX => config().level,
        value => Level::from_u8(value),
    }
}

fn effective_config() -> LogConfig {
    LogConfig {
        level: current_level(),
        ..config().clone()
    }
}

// ============================================================================
// Tests
// ============================================================================
