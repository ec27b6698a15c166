use history::HistoryError;
use interchange::{ParseError, WriteError};
use node::{ElementId, ValidationError};
use project::StoreError;
use scene_graph::SceneError;
use std::path::PathBuf;
use thiserror::Error;

/// Any rejected editor operation. None of these leave the editor in a
/// partially edited state.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("a save or load is in progress")]
    Busy,

    #[error("no save or load is in progress")]
    NotBusy,

    #[error("nothing is selected")]
    EmptySelection,

    #[error("element {0} not found")]
    NotFound(ElementId),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("persistence failed: {message}")]
    Persistence { message: String, retryable: bool },
}

impl EditorError {
    /// Whether the same request could succeed later without changes.
    pub fn is_retryable(&self) -> bool {
        match self {
            EditorError::Busy => true,
            EditorError::Persistence { retryable, .. } => *retryable,
            _ => false,
        }
    }
}

impl From<StoreError> for EditorError {
    fn from(err: StoreError) -> Self {
        EditorError::Persistence {
            retryable: err.is_retryable(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse { path: PathBuf, source: serde_json::Error },

    #[error("invalid config: {0}")]
    Invalid(String),
}
