use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatArchiveError {
    #[error("source directory not found at {}", .0.display())]
    SourceDirMissing(PathBuf),
    #[error("config file invalid or unreadable: {0}")]
    InvalidConfig(String),
    #[error("corrupt or unreadable archive {}: {reason}", .path.display())]
    CorruptArchive { path: PathBuf, reason: String },
    #[error("destination entry already exists: {}", .0.display())]
    DestinationConflict(PathBuf),
    #[error("ledger file unreadable at {}: {reason}", .path.display())]
    LedgerUnreadable { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("unrecognised date `{0}`")]
    Unparsable(String),
    #[error("date out of range `{0}`")]
    OutOfRange(String),
}
