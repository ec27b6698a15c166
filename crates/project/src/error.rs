use node::{DocumentId, ValidationError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {0} not found")]
    NotFound(DocumentId),

    #[error("record name is required")]
    MissingName,

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid manifest {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },
}

impl StoreError {
    /// Whether trying the same operation again could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Io(err) => !matches!(
                err.kind(),
                std::io::ErrorKind::PermissionDenied | std::io::ErrorKind::InvalidInput
            ),
            _ => false,
        }
    }
}
