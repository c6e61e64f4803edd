//! # Error Types
//!
//! Domain-specific error types for parceltrack-core.
//!
//! Most of this crate is deliberately total: normalization and return
//! resolution never fail, they fall back. The error surface that remains
//! is small — malformed inputs that a caller genuinely needs to know about.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Domain errors for pure tracking logic.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// A lifecycle string from storage was not "active"/"inactive".
    #[error("Invalid lifecycle class: '{0}'. Valid options: active, inactive")]
    InvalidLifecycle(String),

    /// A carrier timestamp could not be parsed in any accepted format.
    #[error("Unparseable carrier date: '{0}'")]
    InvalidDate(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidDate("not-a-date".into());
        assert!(err.to_string().contains("not-a-date"));
    }
}
