//! Error handling logic

use thiserror::Error;

/// Errors raised by the field engine and its helpers.
///
/// Only two kinds exist. `InvalidArgument` is a caller bug (out-of-range
/// column, malformed replacement vector) and is always logged before it is
/// returned. `Degenerate` describes an all-zero or non-finite vector; the
/// engine itself never returns it from an operator because it has defined
/// fallbacks for that state, but validation helpers use it to report one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// An argument was outside the range the operation accepts.
    #[error("Invalid Argument: {message}")]
    InvalidArgument {
        /// What was wrong with the argument
        message: String,
    },

    /// The probability vector carries no usable mass.
    #[error("Degenerate Field: {message}")]
    Degenerate {
        /// Description of the degenerate state
        message: String,
    },
}

impl FieldError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        FieldError::InvalidArgument { message: message.into() }
    }

    pub(crate) fn degenerate(message: impl Into<String>) -> Self {
        FieldError::Degenerate { message: message.into() }
    }

    /// Builds the error for a column index that does not fit a field of `width`.
    pub(crate) fn column_out_of_range(what: &str, column: usize, width: usize) -> Self {
        Self::invalid(format!("{} column {} is outside the field (width {})", what, column, width))
    }
}
