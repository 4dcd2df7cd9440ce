//! The persisted document and the records it holds.
//!
//! A [`Document`] is the whole database: every chirp and every user. The
//! store loads one per operation, works on it, and writes it back as a unit.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A short text record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Identifier, unique within `posts`. Assigned by the store.
    pub id: u64,

    /// Text content, already length-checked and censored by the caller.
    pub body: String,
}

/// An account record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identifier, unique within `users`. Assigned by the store.
    pub id: u64,

    /// Login email, unique across all users (exact match).
    pub email: String,

    /// Opaque credential digest. Stored and returned verbatim.
    pub credential: String,
}

/// The root object persisted to disk.
///
/// Either mapping may be absent in older files; both decode as empty. Files
/// written before the rename store posts under `chirps`; they are read as
/// `posts` and written back under the new name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Chirps keyed by their id.
    #[serde(
        default,
        alias = "chirps",
        deserialize_with = "crate::codec::unique_keys"
    )]
    pub posts: BTreeMap<u64, Post>,

    /// Users keyed by their id.
    #[serde(default, deserialize_with = "crate::codec::unique_keys")]
    pub users: BTreeMap<u64, User>,
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a post under the next free id and return it.
    pub fn insert_post(&mut self, body: impl Into<String>) -> Post {
        let post = Post {
            id: next_id(&self.posts),
            body: body.into(),
        };
        self.posts.insert(post.id, post.clone());
        post
    }

    /// Insert a user under the next free id and return it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmailTaken`] if any user already has exactly `email`.
    /// The document is left unchanged in that case.
    pub fn insert_user(
        &mut self,
        email: impl Into<String>,
        credential: impl Into<String>,
    ) -> Result<User> {
        let email = email.into();
        if self.find_user_by_email(&email).is_some() {
            return Err(Error::EmailTaken(email));
        }

        let user = User {
            id: next_id(&self.users),
            email,
            credential: credential.into(),
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    /// Linear scan for a user with exactly this email.
    #[must_use]
    pub fn find_user_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|user| user.email == email)
    }
}

/// Smallest positive integer not currently used as a key.
///
/// Keys are walked in ascending order, so the first gap wins. Ids freed by
/// external edits are handed out again.
pub fn next_id<V>(records: &BTreeMap<u64, V>) -> u64 {
    let mut candidate = 1;
    for &key in records.keys() {
        if key > candidate {
            break;
        }
        if key == candidate {
            candidate += 1;
        }
    }
    candidate
}
