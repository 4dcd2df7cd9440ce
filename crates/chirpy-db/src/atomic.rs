//! Atomic file replacement.
//!
//! Bytes are first written to a sibling temporary file, flushed to disk, then
//! renamed over the target. On POSIX systems a rename within one filesystem
//! is atomic, so readers see either the old file or the new one, never a
//! partial write.
//!
//! If a write fails the temporary file is removed on a best-effort basis and
//! the original file is left intact.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Atomically replace the file at `path` with `bytes`.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created or written, or
/// if the rename fails (e.g. a cross-filesystem move).
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let temp_path = make_temp_path(path);

    let result = write_to_temp_file(&temp_path, bytes).and_then(|()| fs::rename(&temp_path, path));
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// Atomically create the file at `path` holding `bytes`.
///
/// The bytes are written to the temporary file and hard-linked into place.
/// The link fails if `path` already exists, so the existence check and the
/// create are a single step, and `path` never holds a partial write.
///
/// # Errors
///
/// Returns an error of kind [`io::ErrorKind::AlreadyExists`] if `path`
/// exists; it is left untouched. Other errors come from writing the
/// temporary file or from the link itself.
pub fn create_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let temp_path = make_temp_path(path);

    let result = write_to_temp_file(&temp_path, bytes).and_then(|()| fs::hard_link(&temp_path, path));
    let _ = fs::remove_file(&temp_path);
    result
}

/// Temporary path used while replacing `path`.
///
/// `.tmp` is appended to the existing extension, or used as the extension
/// when there is none.
fn make_temp_path(path: &Path) -> PathBuf {
    let mut temp_path = path.to_path_buf();
    let new_extension = match path.extension() {
        Some(ext) => {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".tmp");
            new_ext
        }
        None => OsString::from("tmp"),
    };
    temp_path.set_extension(new_extension);
    temp_path
}

fn write_to_temp_file(temp_path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(temp_path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case::with_extension("/path/to/database.json", "/path/to/database.json.tmp")]
    #[case::without_extension("/path/to/database", "/path/to/database.tmp")]
    #[case::multiple_extensions("/path/to/db.json.bak", "/path/to/db.json.bak.tmp")]
    #[case::relative("database.json", "database.json.tmp")]
    fn make_temp_path_appends_tmp(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(make_temp_path(Path::new(path)), Path::new(expected));
    }

    #[test]
    fn write_atomic_creates_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("database.json");

        write_atomic(&target, b"{}\n").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"{}\n");
    }

    #[test]
    fn write_atomic_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("database.json");
        fs::write(&target, "old content that is longer than the new one").unwrap();

        write_atomic(&target, b"new").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
    }

    #[test]
    fn write_atomic_leaves_no_temp_file_behind() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("database.json");

        write_atomic(&target, b"{}").unwrap();

        assert!(target.exists());
        assert!(!dir.path().join("database.json.tmp").exists());
    }

    #[test]
    fn create_atomic_writes_new_file_and_removes_temp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");

        create_atomic(&path, b"{}").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"{}");
        assert!(!make_temp_path(&path).exists());
    }

    #[test]
    fn create_atomic_leaves_existing_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(&path, b"original").unwrap();

        let err = create_atomic(&path, b"replacement").unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read(&path).unwrap(), b"original");
        assert!(!make_temp_path(&path).exists());
    }

    #[test]
    fn create_atomic_overwrites_stale_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(make_temp_path(&path), b"half a docu").unwrap();

        create_atomic(&path, b"{}").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"{}");
    }

    #[test]
    fn create_atomic_failure_leaves_no_target() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");
        // A directory in the temp file's place makes the write fail.
        fs::create_dir(make_temp_path(&path)).unwrap();

        assert!(create_atomic(&path, b"{}").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn write_atomic_into_missing_directory_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("missing").join("database.json");

        let err = write_atomic(&target, b"{}").unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!target.exists());
    }
}
