//! The application error value carried through dispatch.
//!
//! Cascade models exactly one kind of error: an opaque message-bearing value
//! that a handler can raise (by returning `Err`) or pass to the continuation
//! (via [`Flow::Fail`](crate::Flow::Fail)). The dispatcher never lets it
//! escape the public entry point; it is either consumed by an error handler
//! or surfaces as a 500 fallback response.

use thiserror::Error;

/// Result type alias using [`AppError`].
pub type AppResult<T> = Result<T, AppError>;

/// An opaque application error carried by the dispatch context.
///
/// Plain strings are valid errors:
///
/// ```
/// use cascade_core::AppError;
///
/// let err = AppError::from("m1 error");
/// assert_eq!(err.message(), "m1 error");
/// ```
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct AppError {
    /// Human-readable error message.
    message: String,
}

impl AppError {
    /// Creates a new application error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Creates an application error from any standard error value.
    #[must_use]
    pub fn from_err(err: &(dyn std::error::Error + 'static)) -> Self {
        Self::new(err.to_string())
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for AppError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for AppError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}
