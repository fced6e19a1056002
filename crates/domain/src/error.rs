//! Domain error types.

use thiserror::Error;

/// Errors raised while turning untrusted input into domain records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A required field is missing or a value is out of range.
    #[error("{0}")]
    Validation(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
