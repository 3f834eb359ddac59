use std::io;

/// Errors that can occur while loading a plan or driving a run
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown operation type: '{given}'. Known types: {known:?}")]
    UnknownOperation {
        given: String,
        known: &'static [&'static str],
    },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Workspace error: {0}")]
    WorkspaceError(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for reforge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single structural transform, classified for retry purposes.
///
/// `IndexNotReady` means the workspace's view of project state is stale and a
/// resync may fix it; everything else is permanent and must not be retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("index not ready: {0}")]
    IndexNotReady(String),

    #[error("{0}")]
    Failed(String),
}

impl TransformError {
    pub fn is_transient(&self) -> bool {
        matches!(self, TransformError::IndexNotReady(_))
    }
}
