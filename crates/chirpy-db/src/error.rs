//! Error types for chirpy-db operations.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The kind of record an operation was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// A chirp in the `posts` mapping.
    Post,
    /// An account in the `users` mapping.
    User,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Post => write!(f, "post"),
            Self::User => write!(f, "user"),
        }
    }
}

/// The error type for store operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No record matched the requested key.
    #[error("{kind} not found: {key}")]
    NotFound {
        /// Which mapping was searched.
        kind: RecordKind,
        /// The id or email that missed.
        key: String,
    },

    /// A user with this exact email already exists.
    #[error("email already taken: {0}")]
    EmailTaken(String),

    /// The filesystem rejected a read, write or create.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// The document path being accessed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The document on disk does not match the schema.
    #[error("corrupt document {}: {source}", .path.display())]
    CorruptDocument {
        /// The document path that failed to decode.
        path: PathBuf,
        /// What the codec rejected.
        #[source]
        source: CodecError,
    },
}

/// Failures raised by the document codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The bytes are not JSON, or not shaped like a document.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A mapping key disagrees with the `id` stored in its record.
    #[error("{kind} keyed {key} carries id {id}")]
    KeyMismatch {
        /// Which mapping holds the record.
        kind: RecordKind,
        /// The mapping key.
        key: u64,
        /// The id inside the record.
        id: u64,
    },

    /// Identifiers start at 1.
    #[error("{kind} id 0 is not a valid identifier")]
    ZeroId {
        /// Which mapping holds the record.
        kind: RecordKind,
    },
}

/// A specialized Result type for chirpy-db operations.
pub type Result<T> = std::result::Result<T, Error>;
