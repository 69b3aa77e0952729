use domains::{DomainError, ErrorKind};
use thiserror::Error;

/// Failure of a service operation, carrying the underlying cause.
#[derive(Debug, Error)]
#[error("failed to {operation}: {source}")]
pub struct ServiceError {
    pub operation: &'static str,
    #[source]
    pub source: DomainError,
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Attaches the operation name at the service boundary.
pub(crate) trait OperationExt<T> {
    fn during(self, operation: &'static str) -> Result<T>;
}

impl<T> OperationExt<T> for std::result::Result<T, DomainError> {
    fn during(self, operation: &'static str) -> Result<T> {
        self.map_err(|source| ServiceError { operation, source })
    }
}
