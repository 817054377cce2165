/// Error taxonomy for the reconciliation subsystem
///
/// Oracle clients never surface errors (transport and API failures become
/// "no evidence this round" at the client boundary), so only store and
/// task failures are represented here.
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SyncError {
    /// Token store read or write failed
    #[error("Store error: {0}")]
    Store(String),

    /// Background task panicked or could not be joined
    #[error("Task error: {0}")]
    Task(String),
}

impl SyncError {
    pub fn store(message: impl Into<String>) -> Self {
        SyncError::Store(message.into())
    }

    /// Store failures are the only ones the synchronous stats path surfaces
    pub fn is_store(&self) -> bool {
        matches!(self, SyncError::Store(_))
    }
}

impl From<rusqlite::Error> for SyncError {
    fn from(err: rusqlite::Error) -> Self {
        SyncError::Store(err.to_string())
    }
}

impl From<tokio::task::JoinError> for SyncError {
    fn from(err: tokio::task::JoinError) -> Self {
        SyncError::Task(err.to_string())
    }
}

pub type SyncResult<T> = std::result::Result<T, SyncError>;
