//! Error types for core storage, import, and export.
use thiserror::Error;

/// Top-level error type for fallible core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] redb::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export failed: {0}")]
    Export(#[from] crate::export::ExportError),
}

impl From<redb::DatabaseError> for CoreError {
    fn from(value: redb::DatabaseError) -> Self {
        Self::Storage(value.into())
    }
}

impl From<redb::TransactionError> for CoreError {
    fn from(value: redb::TransactionError) -> Self {
        Self::Storage(value.into())
    }
}

impl From<redb::TableError> for CoreError {
    fn from(value: redb::TableError) -> Self {
        Self::Storage(value.into())
    }
}

impl From<redb::StorageError> for CoreError {
    fn from(value: redb::StorageError) -> Self {
        Self::Storage(value.into())
    }
}

impl From<redb::CommitError> for CoreError {
    fn from(value: redb::CommitError) -> Self {
        Self::Storage(value.into())
    }
}
