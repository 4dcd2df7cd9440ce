//! Chirpy - a tiny microblogging HTTP API.
//!
//! Chirps and accounts live in a single JSON document managed by
//! [`chirpy_db::Store`]. This crate adds the HTTP surface around it: request
//! decoding, chirp length checks, profanity censoring and password hashing.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod censor;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod server;

pub use error::{ApiError, Error, Result};
