//! Runtime errors raised by SQL temporal operations.

use thiserror::Error;

/// An error produced while evaluating a SQL expression at runtime: a
/// malformed literal, a precision outside the legal range, or an unsupported
/// format directive.  The message is user-facing and names the offending
/// value.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct SqlRuntimeError {
    message: String,
}

impl SqlRuntimeError {
    /// Creates a boxed error from a message.
    pub fn from_string(message: String) -> Box<Self> {
        Box::new(Self { message })
    }

    /// The user-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type of fallible SQL runtime operations.  Boxed so that the `Ok`
/// path stays a single machine word for small value types.
pub type SqlResult<T> = Result<T, Box<SqlRuntimeError>>;

/// Lifts a result into a nullable result.  Used by the generated `N`
/// variants of fallible functions.
#[doc(hidden)]
pub fn r2o<T>(value: SqlResult<T>) -> SqlResult<Option<T>> {
    value.map(Some)
}
