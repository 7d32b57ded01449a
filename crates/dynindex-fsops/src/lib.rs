//! Lifecycle of the on-disk working directories: creation at startup and
//! emptying on reset.
#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![warn(unreachable_pub, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info};

pub use error::{FsOpsError, FsOpsResult};

#[cfg(unix)]
use std::os::unix::fs::DirBuilderExt;

#[cfg(unix)]
const DIR_MODE: u32 = 0o755;

/// Create every path (and its parents) that does not already exist as a directory.
///
/// Existing directories are left untouched. Stops at the first failure.
///
/// # Errors
///
/// Returns [`FsOpsError::Io`] when a directory cannot be created, including
/// when the path exists but is not a directory.
pub fn ensure_directories<P: AsRef<Path>>(paths: &[P]) -> FsOpsResult<()> {
    for path in paths {
        let path = path.as_ref();
        if path.is_dir() {
            continue;
        }
        create_dir_all(path).map_err(|source| FsOpsError::io("ensure.create_dir", path, source))?;
        info!(path = %path.display(), "created missing directory");
    }
    Ok(())
}

/// Remove every immediate child of `dir`, keeping `dir` itself.
///
/// Subdirectories are removed recursively; files and symlinks are unlinked.
/// Children removed before a failure stay removed. Returns the number of
/// children removed.
///
/// # Errors
///
/// Returns [`FsOpsError::Io`] when `dir` cannot be listed (for example it does
/// not exist) or when any child cannot be removed.
pub fn empty_directory(dir: &Path) -> FsOpsResult<usize> {
    let entries = fs::read_dir(dir).map_err(|source| FsOpsError::io("empty.read_dir", dir, source))?;

    let mut removed = 0;
    for entry in entries {
        let entry = entry.map_err(|source| FsOpsError::io("empty.read_dir_entry", dir, source))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|source| FsOpsError::io("empty.file_type", &path, source))?;

        let outcome = if file_type.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        match outcome {
            Ok(()) => removed += 1,
            // Raced with another remover; the child is gone either way.
            Err(err) if err.kind() == io::ErrorKind::NotFound => removed += 1,
            Err(source) => return Err(FsOpsError::io("empty.remove", path, source)),
        }
        debug!(path = %path.display(), "removed directory entry");
    }

    info!(dir = %dir.display(), removed, "emptied directory");
    Ok(removed)
}

#[cfg(unix)]
fn create_dir_all(path: &Path) -> io::Result<()> {
    fs::DirBuilder::new()
        .recursive(true)
        .mode(DIR_MODE)
        .create(path)
}

#[cfg(not(unix))]
fn create_dir_all(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use tempfile::TempDir;

    type TestResult<T> = Result<T, Box<dyn Error>>;

    fn temp_dir() -> TestResult<TempDir> {
        Ok(tempfile::Builder::new()
            .prefix("dynindex-fsops-")
            .tempdir()?)
    }

    #[test]
    fn ensure_directories_creates_nested_paths() -> TestResult<()> {
        let temp = temp_dir()?;
        let data = temp.path().join("data");
        let repos = data.join("repos");
        let index = temp.path().join("elsewhere/index");

        ensure_directories(&[&data, &repos, &index])?;

        assert!(data.is_dir());
        assert!(repos.is_dir());
        assert!(index.is_dir());
        Ok(())
    }

    #[test]
    fn ensure_directories_keeps_existing_contents() -> TestResult<()> {
        let temp = temp_dir()?;
        let marker = temp.path().join("keep.txt");
        fs::write(&marker, b"keep")?;

        ensure_directories(&[temp.path()])?;

        assert_eq!(fs::read(&marker)?, b"keep");
        Ok(())
    }

    #[test]
    fn ensure_directories_fails_for_file_path() -> TestResult<()> {
        let temp = temp_dir()?;
        let file = temp.path().join("occupied");
        fs::write(&file, b"not a dir")?;

        let err = ensure_directories(&[&file])
            .err()
            .ok_or_else(|| io::Error::other("expected create failure"))?;
        assert_eq!(err.operation(), "ensure.create_dir");
        assert_eq!(err.path(), file.as_path());
        Ok(())
    }

    #[test]
    fn empty_directory_removes_files_and_subdirectories() -> TestResult<()> {
        let temp = temp_dir()?;
        let root = temp.path().join("repos");
        fs::create_dir_all(root.join("c/d"))?;
        fs::write(root.join("a"), b"a")?;
        fs::write(root.join("b"), b"b")?;
        fs::write(root.join("c/d/shard"), b"shard")?;

        let removed = empty_directory(&root)?;

        assert_eq!(removed, 3);
        assert!(root.is_dir());
        assert_eq!(fs::read_dir(&root)?.count(), 0);
        Ok(())
    }

    #[test]
    fn empty_directory_is_idempotent() -> TestResult<()> {
        let temp = temp_dir()?;
        fs::write(temp.path().join("shard"), b"x")?;

        assert_eq!(empty_directory(temp.path())?, 1);
        assert_eq!(empty_directory(temp.path())?, 0);
        assert!(temp.path().is_dir());
        Ok(())
    }

    #[test]
    fn empty_directory_reports_missing_path() -> TestResult<()> {
        let temp = temp_dir()?;
        let missing = temp.path().join("missing");

        let err = empty_directory(&missing)
            .err()
            .ok_or_else(|| io::Error::other("expected listing failure"))?;
        assert_eq!(err.operation(), "empty.read_dir");
        assert_eq!(err.path(), missing.as_path());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn empty_directory_unlinks_symlinks_without_following() -> TestResult<()> {
        let temp = temp_dir()?;
        let outside = temp.path().join("outside");
        let root = temp.path().join("index");
        fs::create_dir_all(&outside)?;
        fs::create_dir_all(&root)?;
        fs::write(outside.join("precious"), b"keep")?;
        std::os::unix::fs::symlink(&outside, root.join("link"))?;

        assert_eq!(empty_directory(&root)?, 1);
        assert!(outside.join("precious").is_file());
        Ok(())
    }
}
