//! Error types for srs-core.

use thiserror::Error;

/// Result type alias using SessionError.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors raised by the review session coordinator.
///
/// Both variants are recoverable: the session and its items are left exactly
/// as they were before the failing call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session is already completed")]
    OutOfSequence,

    #[error("invalid grade: {0}")]
    InvalidGrade(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_out_of_sequence() {
        assert_eq!(
            SessionError::OutOfSequence.to_string(),
            "session is already completed"
        );
    }

    #[test]
    fn display_invalid_grade() {
        let error = SessionError::InvalidGrade("7".to_string());
        assert_eq!(error.to_string(), "invalid grade: 7");
    }
}
