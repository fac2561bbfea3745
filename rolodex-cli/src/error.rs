//! CLI error types and result alias.

use miette::Diagnostic;
use rolodex_query::{ErrorCode, QueryError};
use rolodex_sqlite::SqliteError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// IO error
    #[error("IO error: {0}")]
    #[diagnostic(code(rolodex::io))]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    #[diagnostic(code(rolodex::config), help("check rolodex.toml or the ROLODEX_* variables"))]
    Config(String),

    /// Malformed JSON given on the command line or in an input file
    #[error("Input error: {0}")]
    #[diagnostic(code(rolodex::input))]
    Input(String),

    /// Error raised by the address book
    #[error("{0}")]
    #[diagnostic(code(rolodex::query))]
    Query(#[from] QueryError),
}

impl CliError {
    /// The error name reported in the JSON error envelope.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Query(err) => err.code.name(),
            Self::Input(_) => ErrorCode::TypeMismatch.name(),
            Self::Io(_) | Self::Config(_) => ErrorCode::Unknown.name(),
        }
    }

    /// The message reported in the JSON error envelope.
    pub fn message(&self) -> String {
        match self {
            Self::Query(err) => err.message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<SqliteError> for CliError {
    fn from(err: SqliteError) -> Self {
        CliError::Query(err.into())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Input(format!("Failed to parse JSON: {}", err))
    }
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        CliError::Config(format!("Failed to parse TOML: {}", err))
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(err: toml::ser::Error) -> Self {
        CliError::Config(format!("Failed to serialize TOML: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_name() {
        let err = CliError::from(QueryError::not_found("Contact", 3));
        assert_eq!(err.name(), "NotFoundError");
        assert!(err.message().contains('3'));
    }

    #[test]
    fn test_input_error_name() {
        let err = CliError::from(serde_json::from_str::<serde_json::Value>("{").unwrap_err());
        assert_eq!(err.name(), "TypeMismatchError");
        assert!(err.message().starts_with("Input error"));
    }

    #[test]
    fn test_storage_error_name() {
        let err = CliError::from(SqliteError::config("bad path"));
        assert_eq!(err.name(), "UnknownError");
    }
}
