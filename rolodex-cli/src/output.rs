//! Command output.
//!
//! Command results are printed to stdout as a JSON envelope:
//! `{"status": "success", "result": ...}` or
//! `{"status": "error", "error": {"name": ..., "message": ...}}`.
//! Styled human-readable messages go to stderr, except for `version`.

use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::{Value as JsonValue, json};

use crate::error::{CliError, CliResult};

/// Wrap a result in the success envelope.
pub fn success_envelope(result: JsonValue) -> JsonValue {
    json!({ "status": "success", "result": result })
}

/// Wrap an error in the error envelope.
pub fn error_envelope(err: &CliError) -> JsonValue {
    json!({
        "status": "error",
        "error": { "name": err.name(), "message": err.message() },
    })
}

fn render(value: &JsonValue, pretty: bool) -> String {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    // Serializing a `serde_json::Value` cannot fail
    rendered.unwrap_or_default()
}

/// Print a successful command result.
pub fn print_success<T: Serialize>(result: &T, pretty: bool) -> CliResult<()> {
    let value = serde_json::to_value(result)?;
    println!("{}", render(&success_envelope(value), pretty));
    Ok(())
}

/// Print a failed command result.
pub fn print_error(err: &CliError, pretty: bool) {
    println!("{}", render(&error_envelope(err), pretty));
}

/// Print a section header
pub fn section(text: &str) {
    println!("{}", text.bold().white());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a newline
pub fn newline() {
    println!();
}

/// Print dimmed text
pub fn dim(text: &str) {
    println!("{}", text.dimmed());
}

/// Print a success message
pub fn success(text: &str) {
    eprintln!("{} {}", "✔".green().bold(), text.green());
}

/// Print an info message
pub fn info(text: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), text);
}

/// Print an error message
pub fn error(text: &str) {
    eprintln!("{} {}", "✖".red().bold(), text.red());
}
