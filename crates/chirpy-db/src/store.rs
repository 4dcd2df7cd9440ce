//! The document store.
//!
//! A [`Store`] is bound to one JSON file. Every operation loads the whole
//! document from disk under a reader-writer lock:
//!
//! - Reads (`get_post`, `list_posts`, `get_user_by_email`) hold the shared
//!   lock while loading.
//! - Creates (`create_post`, `create_user`) hold the exclusive lock across
//!   load, compute and persist, so the id scan and the email uniqueness check
//!   see every earlier write and no later one.
//!
//! Operations never yield and never retry; they block only on file I/O.
//! Construct one `Store` per document path and share it (e.g. behind an
//! `Arc`) between callers.
//!
//! # Example
//!
//! ```no_run
//! use chirpy_db::Store;
//!
//! # fn example() -> chirpy_db::Result<()> {
//! let store = Store::open("database.json")?;
//! let post = store.create_post("hello")?;
//! assert_eq!(store.get_post(post.id)?.body, "hello");
//! # Ok(())
//! # }
//! ```

use crate::atomic::{create_atomic, write_atomic};
use crate::codec;
use crate::document::{Document, Post, User};
use crate::error::{Error, RecordKind, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info, trace, warn};

/// Handle to a single-file JSON document.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    // Guards no data: the document lives on disk and is replaced atomically,
    // so a poisoned lock is safe to keep using.
    lock: RwLock<()>,
}

impl Store {
    /// Bind a store to `path`, creating an empty document if no file exists.
    ///
    /// An existing file is left untouched; its contents are not validated
    /// until the first operation loads it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        create_if_missing(&path)?;

        Ok(Self {
            path,
            lock: RwLock::new(()),
        })
    }

    /// Path of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store a new post under the smallest unused id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] or [`Error::CorruptDocument`] if the document
    /// cannot be loaded or persisted.
    pub fn create_post(&self, body: impl Into<String>) -> Result<Post> {
        let post = self.update(|doc| Ok(doc.insert_post(body)))?;
        debug!(id = post.id, "Created post");
        Ok(post)
    }

    /// Look up a post by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no post has this id.
    pub fn get_post(&self, id: u64) -> Result<Post> {
        self.read(|doc| {
            doc.posts.get(&id).cloned().ok_or_else(|| Error::NotFound {
                kind: RecordKind::Post,
                key: id.to_string(),
            })
        })
    }

    /// All stored posts. Callers must not rely on the order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] or [`Error::CorruptDocument`] if the document
    /// cannot be loaded.
    pub fn list_posts(&self) -> Result<Vec<Post>> {
        self.read(|doc| Ok(doc.posts.values().cloned().collect()))
    }

    /// Store a new user, enforcing email uniqueness.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmailTaken`] if a user already has exactly `email`;
    /// nothing is written in that case.
    pub fn create_user(
        &self,
        email: impl Into<String>,
        credential: impl Into<String>,
    ) -> Result<User> {
        let user = self.update(|doc| doc.insert_user(email, credential))?;
        debug!(id = user.id, "Created user");
        Ok(user)
    }

    /// Look up a user by exact email.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no user has this email.
    pub fn get_user_by_email(&self, email: &str) -> Result<User> {
        self.read(|doc| {
            doc.find_user_by_email(email)
                .cloned()
                .ok_or_else(|| Error::NotFound {
                    kind: RecordKind::User,
                    key: email.to_string(),
                })
        })
    }

    /// Run `f` against the current document under the shared lock.
    fn read<T>(&self, f: impl FnOnce(&Document) -> Result<T>) -> Result<T> {
        let _guard = self.lock.read().unwrap_or_else(PoisonError::into_inner);
        let doc = self.load()?;
        f(&doc)
    }

    /// Load, apply `f`, and persist, all under the exclusive lock.
    ///
    /// Nothing is written if loading or `f` fails.
    fn update<T>(&self, f: impl FnOnce(&mut Document) -> Result<T>) -> Result<T> {
        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        let mut doc = self.load()?;
        let value = f(&mut doc)?;
        self.persist(&doc)?;
        Ok(value)
    }

    fn load(&self) -> Result<Document> {
        trace!(path = %self.path.display(), "Loading document");
        let bytes = fs::read(&self.path).map_err(|source| self.io_error(source))?;
        codec::decode(&bytes).map_err(|source| {
            warn!(path = %self.path.display(), error = %source, "Document failed to decode");
            Error::CorruptDocument {
                path: self.path.clone(),
                source,
            }
        })
    }

    fn persist(&self, doc: &Document) -> Result<()> {
        let bytes = codec::encode(doc).map_err(|source| Error::CorruptDocument {
            path: self.path.clone(),
            source,
        })?;
        write_atomic(&self.path, &bytes).map_err(|source| self.io_error(source))?;
        trace!(
            path = %self.path.display(),
            posts = doc.posts.len(),
            users = doc.users.len(),
            "Persisted document"
        );
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> Error {
        Error::Io {
            path: self.path.clone(),
            source,
        }
    }
}

/// Delete the document at `path`. A missing file is not an error.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file exists but cannot be removed.
pub fn remove(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    match fs::remove_file(path) {
        Ok(()) => {
            info!(path = %path.display(), "Removed document");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(Error::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write an empty document unless something already exists at `path`.
///
/// The document is staged in a temporary file and linked into place, so a
/// failed or interrupted create never leaves a partial file at `path`.
fn create_if_missing(path: &Path) -> Result<()> {
    let bytes = codec::encode(&Document::new()).map_err(|source| Error::CorruptDocument {
        path: path.to_path_buf(),
        source,
    })?;

    match create_atomic(path, &bytes) {
        Ok(()) => {
            info!(path = %path.display(), "Created empty document");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            debug!(path = %path.display(), "Using existing document");
            Ok(())
        }
        Err(source) => Err(Error::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("database.json")).unwrap();
        (dir, store)
    }

    #[test]
    fn open_creates_empty_document() {
        let (_dir, store) = open_temp();

        let bytes = fs::read(store.path()).unwrap();
        assert_eq!(codec::decode(&bytes).unwrap(), Document::new());
    }

    #[test]
    fn open_in_missing_directory_is_io_error() {
        let dir = TempDir::new().unwrap();

        let err = Store::open(dir.path().join("missing").join("database.json")).unwrap_err();

        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn failed_open_leaves_no_partial_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("database.json");
        fs::create_dir(dir.path().join("database.json.tmp")).unwrap();

        let err = Store::open(&path).unwrap_err();

        assert!(matches!(err, Error::Io { .. }));
        assert!(!path.exists());

        fs::remove_dir(dir.path().join("database.json.tmp")).unwrap();
        let store = Store::open(&path).unwrap();
        assert!(store.list_posts().unwrap().is_empty());
    }

    #[test]
    fn failed_create_user_does_not_rewrite_file() {
        let (_dir, store) = open_temp();
        store.create_user("a@example.com", "x").unwrap();
        let before = fs::read(store.path()).unwrap();

        let err = store.create_user("a@example.com", "y").unwrap_err();

        assert!(matches!(err, Error::EmailTaken(_)));
        assert_eq!(fs::read(store.path()).unwrap(), before);
    }

    #[test]
    fn create_post_reuses_id_removed_by_external_edit() {
        let (_dir, store) = open_temp();
        for body in ["a", "b", "c"] {
            store.create_post(body).unwrap();
        }

        let mut doc = codec::decode(&fs::read(store.path()).unwrap()).unwrap();
        doc.posts.remove(&1);
        fs::write(store.path(), codec::encode(&doc).unwrap()).unwrap();

        assert_eq!(store.create_post("d").unwrap().id, 1);
        assert_eq!(store.create_post("e").unwrap().id, 4);
    }

    #[test]
    fn store_survives_poisoned_lock() {
        let (_dir, store) = open_temp();
        let store = Arc::new(store);

        let poisoner = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(store.lock.is_poisoned());
        let post = store.create_post("still works").unwrap();
        assert_eq!(store.get_post(post.id).unwrap().body, "still works");
    }

    #[test]
    fn remove_deletes_document_and_tolerates_missing_file() {
        let (_dir, store) = open_temp();
        let path = store.path().to_path_buf();

        remove(&path).unwrap();
        assert!(!path.exists());

        remove(&path).unwrap();
    }
}
