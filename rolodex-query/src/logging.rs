//! Logging setup for Rolodex.
//!
//! Library code logs through the `tracing` macros and never installs a
//! subscriber itself. Binaries call [`init`] (environment driven) or
//! [`init_with`] (explicit settings) once at startup; both need the
//! `tracing-subscriber` feature and are silent without it.
//!
//! # Environment Variables
//!
//! - `ROLODEX_DEBUG=true` or `ROLODEX_DEBUG=1` - Enable debug logging
//! - `ROLODEX_LOG_LEVEL=debug|info|warn|error|trace` - Set the log level
//! - `ROLODEX_LOG_FORMAT=json|pretty|compact` - Set the output format (default: json)
//!
//! ```rust,no_run
//! use rolodex_query::logging;
//!
//! logging::init();
//! ```

use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Once;

static INIT: Once = Once::new();

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line human readable output.
    Pretty,
    /// Single-line human readable output.
    Compact,
}

impl LogFormat {
    /// The format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
            Self::Compact => "compact",
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check if debug logging is enabled via `ROLODEX_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("ROLODEX_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Normalize a level name, `None` when it is not one.
pub fn parse_level(level: &str) -> Option<&'static str> {
    match level.to_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    }
}

/// The level from `ROLODEX_LOG_LEVEL`.
///
/// Defaults to "debug" if `ROLODEX_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    env::var("ROLODEX_LOG_LEVEL")
        .ok()
        .and_then(|level| parse_level(&level))
        .unwrap_or(if is_debug_enabled() { "debug" } else { "warn" })
}

/// The format from `ROLODEX_LOG_FORMAT`, JSON when unset or unknown.
pub fn get_log_format() -> LogFormat {
    env::var("ROLODEX_LOG_FORMAT")
        .ok()
        .and_then(|f| f.parse().ok())
        .unwrap_or_default()
}

/// Initialize logging from the environment.
///
/// Does nothing unless `ROLODEX_DEBUG` or `ROLODEX_LOG_LEVEL` is set.
/// Subsequent calls, and calls after [`init_with`], are no-ops.
pub fn init() {
    if !is_debug_enabled() && env::var("ROLODEX_LOG_LEVEL").is_err() {
        return;
    }
    init_with(get_log_level(), get_log_format());
}

/// Initialize logging with an explicit level and format.
///
/// Unknown levels fall back to "warn". Only the first initialization in a
/// process takes effect.
pub fn init_with(level: &str, format: LogFormat) {
    let level = parse_level(level).unwrap_or("warn");
    INIT.call_once(|| install(level, format));
}

#[cfg(feature = "tracing-subscriber")]
fn install(level: &'static str, format: LogFormat) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_new(format!(
        "rolodex={},rolodex_query={},rolodex_sqlite={},rolodex_cli={}",
        level, level, level, level
    ))
    .unwrap_or_else(|_| EnvFilter::new("warn"));

    // Logs go to stderr so command output on stdout stays parseable.
    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
    };

    if installed.is_ok() {
        tracing::info!(level, format = %format, "Rolodex logging initialized");
    }
}

#[cfg(not(feature = "tracing-subscriber"))]
fn install(_level: &'static str, _format: LogFormat) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Some("debug"));
        assert_eq!(parse_level("verbose"), None);
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("Pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert_eq!("compact".parse::<LogFormat>(), Ok(LogFormat::Compact));
        assert!("xml".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::default().to_string(), "json");
    }
}
