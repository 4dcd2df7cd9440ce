//! Single-file JSON document store for chirps and users.
//!
//! The whole database is one JSON document holding a `posts` and a `users`
//! mapping. A [`Store`] loads it on every operation, serializes access with a
//! reader-writer lock, and replaces the file atomically on every write.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod atomic;
pub mod codec;
pub mod document;
pub mod error;
pub mod store;

pub use document::{Document, Post, User};
pub use error::{CodecError, Error, RecordKind, Result};
pub use store::{Store, remove};
