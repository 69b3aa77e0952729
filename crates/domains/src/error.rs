//! # DomainError
//!
//! Tagged failure kinds raised by repositories and gateways.

use thiserror::Error;

/// The primary error type for all port operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Referenced document does not exist (e.g., User, Thread)
    #[error("{entity} not found with ID {id}")]
    NotFound { entity: &'static str, id: String },

    /// Input rejected before reaching the store (e.g., empty username)
    #[error("validation error: {0}")]
    ValidationFailed(String),

    /// Store unreachable, pool exhausted or closed
    #[error("connectivity failure: {0}")]
    ConnectivityFailed(String),

    /// Unique constraint violated (e.g., username already taken)
    #[error("conflict: {0}")]
    ConflictFailed(String),

    /// Decode or serialization fault inside an adapter
    #[error("internal error: {0}")]
    Internal(String),
}

/// Discriminant of [`DomainError`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    ValidationFailed,
    ConnectivityFailed,
    ConflictFailed,
    Internal,
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { entity, id: id.into() }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationFailed(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::ValidationFailed(_) => ErrorKind::ValidationFailed,
            Self::ConnectivityFailed(_) => ErrorKind::ConnectivityFailed,
            Self::ConflictFailed(_) => ErrorKind::ConflictFailed,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// A specialized Result type for port operations.
pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_id() {
        let err = DomainError::not_found("User", "u1");
        assert_eq!(err.to_string(), "User not found with ID u1");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn kinds_are_distinct_per_variant() {
        assert_eq!(DomainError::validation("x").kind(), ErrorKind::ValidationFailed);
        assert_eq!(
            DomainError::ConnectivityFailed("down".into()).kind(),
            ErrorKind::ConnectivityFailed
        );
        assert_eq!(
            DomainError::ConflictFailed("dup".into()).kind(),
            ErrorKind::ConflictFailed
        );
        assert_eq!(DomainError::Internal("bad row".into()).kind(), ErrorKind::Internal);
    }
}
