use thiserror::Error;

use super::{FileKind, MAX_CAPACITY, MAX_FILE_BYTES, MIN_CAPACITY};

/// every way an engine operation can fail
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FsError {
    #[error("malformed path {path:?}: {reason}")]
    MalformedPath { path: String, reason: &'static str },
    #[error("no such file or directory: {0}")]
    NotFound(String),
    #[error("not a directory: {0}")]
    NotADirectory(String),
    #[error("not a file: {0}")]
    NotAFile(String),
    #[error("{path} is a {found:?}, expected a {expected:?}")]
    WrongType {
        path: String,
        expected: FileKind,
        found: FileKind,
    },
    #[error("directory not empty: {0}")]
    DirectoryNotEmpty(String),
    #[error("the root directory can't be removed")]
    IllegalRootRemoval,
    #[error("no free {0} left")]
    StorageExhausted(&'static str),
    #[error("{size} bytes exceed the maximum file size of {MAX_FILE_BYTES} bytes")]
    FileTooLarge { size: usize },
    #[error("capacity of {0} bytes is outside {MIN_CAPACITY}..={MAX_CAPACITY}")]
    InvalidCapacity(u64),
    #[error("{kind} id {id} can't be released")]
    InvalidId { kind: &'static str, id: u16 },
    #[error("corrupted container: {0}")]
    Corrupted(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode record: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("failed to decode record: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

pub type Result<T> = std::result::Result<T, FsError>;

impl FsError {
    pub(crate) fn malformed(path: &str, reason: &'static str) -> Self {
        FsError::MalformedPath {
            path: path.to_string(),
            reason,
        }
    }
}
