//! Error types for filter evaluation and address-book operations.
//!
//! Every failure carries an [`ErrorCode`] from a small taxonomy:
//!
//! - `TypeMismatch` - the request is structurally wrong (a filter that is not an
//!   object, a missing `filterType`, a match value of the wrong JSON type)
//! - `InvalidValues` - well formed but semantically invalid (unknown match flag,
//!   unknown attribute name, negative id)
//! - `NotFound` - a record addressed by id does not exist
//! - `Unknown` - the backing store failed for reasons opaque to the caller
//! - `Aborted` - a multi-record operation was abandoned part way
//!
//! ```rust
//! use rolodex_query::{ErrorCode, QueryError};
//!
//! let err = QueryError::unknown_attribute("nickname");
//! assert_eq!(err.code, ErrorCode::InvalidValues);
//! assert_eq!(err.code.name(), "InvalidValuesError");
//! ```

use std::fmt;
use thiserror::Error;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The request has the wrong shape or a value has the wrong type.
    TypeMismatch,
    /// The request is well formed but names something invalid.
    InvalidValues,
    /// The addressed record does not exist.
    NotFound,
    /// The storage layer failed.
    Unknown,
    /// The operation was abandoned.
    Aborted,
}

impl ErrorCode {
    /// The platform error name reported to callers.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TypeMismatch => "TypeMismatchError",
            Self::InvalidValues => "InvalidValuesError",
            Self::NotFound => "NotFoundError",
            Self::Unknown => "UnknownError",
            Self::Aborted => "AbortError",
        }
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::TypeMismatch => "Type mismatch",
            Self::InvalidValues => "Invalid values",
            Self::NotFound => "Record not found",
            Self::Unknown => "Storage failure",
            Self::Aborted => "Operation aborted",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that was being performed.
    pub operation: Option<String>,
    /// The attribute involved.
    pub attribute: Option<String>,
    /// The statement sent to the store (if any).
    pub statement: Option<String>,
    /// Help text.
    pub help: Option<String>,
}

/// Errors that can occur during query operations.
#[derive(Error, Debug)]
pub struct QueryError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.name(), self.message)
    }
}

impl QueryError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add context about the operation.
    pub fn with_context(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Set the attribute.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.context.attribute = Some(attribute.into());
        self
    }

    /// Set the statement sent to the store.
    pub fn with_statement(mut self, statement: impl Into<String>) -> Self {
        self.context.statement = Some(statement.into());
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// Create a type mismatch error.
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::TypeMismatch, message)
    }

    /// Create an invalid values error.
    pub fn invalid_values(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidValues, message)
    }

    /// Create an error for an attribute missing from the registry.
    pub fn unknown_attribute(attribute: impl Into<String>) -> Self {
        let attribute = attribute.into();
        Self::invalid_values(format!("Unknown attribute name: {}", attribute))
            .with_attribute(&attribute)
            .with_help("Attribute names are dotted paths such as `name.firstName`")
    }

    /// Create a not found error.
    pub fn not_found(entity: impl Into<String>, id: i64) -> Self {
        let entity = entity.into();
        Self::new(ErrorCode::NotFound, format!("No {} with id {}", entity, id))
    }

    /// Create a storage failure error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unknown, message)
    }

    /// Create an aborted error.
    pub fn aborted(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Aborted, message)
    }

    // ============== Error Classification ==============

    /// Check if this is a not found error.
    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::NotFound
    }

    /// Check if the caller sent something unusable.
    pub fn is_client_error(&self) -> bool {
        matches!(self.code, ErrorCode::TypeMismatch | ErrorCode::InvalidValues)
    }

    /// Check if the storage layer failed.
    pub fn is_storage_error(&self) -> bool {
        self.code == ErrorCode::Unknown
    }

    /// Render the error as the `{ name, message }` object reported to callers.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.code.name(),
            "message": self.message,
        })
    }

    /// Display the error with all of its context.
    pub fn display_full(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error [{}]: {}\n", self.code.name(), self.message));

        if let Some(ref op) = self.context.operation {
            output.push_str(&format!("\n  While: {}\n", op));
        }
        if let Some(ref attribute) = self.context.attribute {
            output.push_str(&format!("  Attribute: {}\n", attribute));
        }
        if let Some(ref statement) = self.context.statement {
            output.push_str(&format!("  Statement: {}\n", statement));
        }
        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }
        if let Some(ref source) = self.source {
            output.push_str(&format!("\nCaused by: {}\n", source));
        }

        output
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::type_mismatch(format!("Malformed JSON: {}", err))
    }
}
