use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("media source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("malformed record: {0}")]
    MalformedRecord(String),
    #[error("load cancelled")]
    Cancelled,
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Coarse error category carried by [`crate::models::LoadState::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    SourceUnavailable,
    MalformedRecord,
    Cancelled,
    Storage,
    Config,
    InvalidArgument,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::SourceUnavailable(_) => ErrorKind::SourceUnavailable,
            CoreError::MalformedRecord(_) => ErrorKind::MalformedRecord,
            CoreError::Cancelled => ErrorKind::Cancelled,
            CoreError::Sqlite(_) => ErrorKind::Storage,
            CoreError::Config(_) => ErrorKind::Config,
            CoreError::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }
}
