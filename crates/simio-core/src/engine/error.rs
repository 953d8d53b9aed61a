use super::handle::FileId;
use crate::core::codec::CodecError;
use crate::core::filetype::FileType;
use crate::core::item::{ItemKind, MultiplicityError};
use std::fmt;
use std::io;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Read => write!(f, "reading"),
            Direction::Write => write!(f, "writing"),
        }
    }
}

/// Failures of the record I/O layer.
///
/// Most variants describe a broken contract between caller and layer and are
/// fatal: see [`FioError::is_fatal`]. `Transfer` and `Parse` report a single
/// item that could not be moved and leave the handle usable.
#[derive(Debug, Error)]
pub enum FioError {
    #[error("Invalid file handle {id}")]
    InvalidHandle { id: FileId },

    #[error("Invalid file open mode '{mode}'")]
    InvalidMode { mode: String },

    #[error("File handle {id} is closed")]
    HandleClosed { id: FileId },

    #[error("File '{path}' of type {file_type} has no item encoding")]
    UnsupportedFileType { path: String, file_type: FileType },

    #[error(transparent)]
    Multiplicity(#[from] MultiplicityError),

    #[error("Invalid string length {length} for '{desc}' in '{path}'")]
    InvalidStringLength { path: String, desc: String, length: i64 },

    #[error("Cannot open file '{path}' for reading: {source}")]
    OpenForRead { path: String, source: io::Error },

    #[error("Cannot open file '{path}' for writing: {source}")]
    OpenForWrite { path: String, source: io::Error },

    #[error("Cannot flush file '{path}' (out of disk space or quota?): {source}")]
    Flush { path: String, source: io::Error },

    #[error("Cannot seek in file '{path}': {source}")]
    Seek { path: String, source: io::Error },

    #[error("Standard streams do not support {operation}")]
    Stdio { operation: &'static str },

    #[error("Error {direction} {kind} '{desc}' in '{path}': {source}")]
    Transfer {
        direction: Direction,
        kind: ItemKind,
        desc: String,
        path: String,
        source: io::Error,
    },

    #[error("Cannot read {kind} '{desc}' from '{path}': {reason}")]
    Parse {
        kind: ItemKind,
        desc: String,
        path: String,
        reason: String,
    },
}

impl FioError {
    pub fn is_fatal(&self) -> bool {
        !matches!(self, FioError::Transfer { .. } | FioError::Parse { .. })
    }

    pub(crate) fn from_codec(
        err: CodecError,
        direction: Direction,
        kind: ItemKind,
        desc: &str,
        path: String,
    ) -> Self {
        let desc = desc.to_string();
        match err {
            CodecError::Io(source) => FioError::Transfer {
                direction,
                kind,
                desc,
                path,
                source,
            },
            CodecError::InvalidStringLength { length } => {
                FioError::InvalidStringLength { path, desc, length }
            }
            other if direction == Direction::Read => FioError::Parse {
                kind,
                desc,
                path,
                reason: other.to_string(),
            },
            other => FioError::Transfer {
                direction,
                kind,
                desc,
                path,
                source: io::Error::new(io::ErrorKind::InvalidInput, other.to_string()),
            },
        }
    }
}
