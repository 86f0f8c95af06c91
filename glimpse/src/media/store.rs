//! Disk-backed temporary media storage.
//!
//! Uploaded bytes are written to uniquely named temporary files so they can
//! be referenced by path. Files are kept on disk after the handle is dropped
//! and must be removed with [`TempMediaStore::release`]; [`ScratchFiles`]
//! does that for every file of one request.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Creates and deletes temporary media files.
#[derive(Debug, Clone)]
pub struct TempMediaStore {
    dir: Option<PathBuf>,
    prefix: String,
}

impl Default for TempMediaStore {
    fn default() -> Self {
        Self {
            dir: None,
            prefix: Self::DEFAULT_PREFIX.to_owned(),
        }
    }
}

impl TempMediaStore {
    /// Prefix of every file name created by the store.
    pub const DEFAULT_PREFIX: &'static str = "glimpse-";

    /// Store files in the system temporary directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store files in `dir` instead of the system temporary directory.
    #[must_use]
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            ..Self::default()
        }
    }

    /// Directory files are created in, if overridden.
    #[must_use]
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Write `bytes` to a new, uniquely named file ending in `suffix`.
    ///
    /// Never overwrites an existing file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MediaWrite`] if the file cannot be created or written.
    pub fn store(&self, bytes: &[u8], suffix: &str) -> Result<PathBuf> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&self.prefix).suffix(suffix);

        let mut file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(Error::MediaWrite)?;

        file.write_all(bytes).map_err(Error::MediaWrite)?;
        file.flush().map_err(Error::MediaWrite)?;

        let (_, path) = file.keep().map_err(|e| Error::MediaWrite(e.error))?;
        debug!(path = %path.display(), bytes = bytes.len(), "stored temporary media");
        Ok(path)
    }

    /// Delete `path` if it exists. Deleting an absent file is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] for failures other than the file being absent.
    pub fn release(&self, path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => {
                debug!(path = %path.display(), "released temporary media");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

/// Temporary files owned by one request.
///
/// Every staged path is released exactly once, either by an explicit
/// [`release_all`](Self::release_all) or when the guard is dropped.
#[derive(Debug)]
pub struct ScratchFiles {
    store: TempMediaStore,
    paths: Vec<PathBuf>,
}

impl ScratchFiles {
    /// Create an empty set backed by `store`.
    #[must_use]
    pub const fn new(store: TempMediaStore) -> Self {
        Self {
            store,
            paths: Vec::new(),
        }
    }

    /// Store `bytes` and track the resulting path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MediaWrite`] if the store fails.
    pub fn stage(&mut self, bytes: &[u8], suffix: &str) -> Result<PathBuf> {
        let path = self.store.store(bytes, suffix)?;
        self.paths.push(path.clone());
        Ok(path)
    }

    /// Paths still awaiting release.
    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Release every tracked path. Returns how many paths were processed.
    ///
    /// Failures are logged and do not stop the remaining deletions.
    pub fn release_all(&mut self) -> usize {
        let paths = std::mem::take(&mut self.paths);
        for path in &paths {
            if let Err(e) = self.store.release(path) {
                warn!(path = %path.display(), error = %e, "failed to release temporary media");
            }
        }
        paths.len()
    }
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod temp_media_store {
        use super::*;

        #[test]
        fn store_writes_bytes_with_suffix() {
            let dir = tempfile::tempdir().unwrap();
            let store = TempMediaStore::in_dir(dir.path());

            let path = store.store(b"frame-data", ".mp4").unwrap();

            assert!(path.starts_with(dir.path()));
            assert_eq!(path.extension().and_then(|e| e.to_str()), Some("mp4"));
            assert_eq!(std::fs::read(&path).unwrap(), b"frame-data");
        }

        #[test]
        fn store_never_reuses_a_name() {
            let dir = tempfile::tempdir().unwrap();
            let store = TempMediaStore::in_dir(dir.path());

            let a = store.store(b"a", ".jpg").unwrap();
            let b = store.store(b"b", ".jpg").unwrap();

            assert_ne!(a, b);
            assert_eq!(std::fs::read(&a).unwrap(), b"a");
        }

        #[test]
        fn store_into_missing_dir_is_media_write() {
            let dir = tempfile::tempdir().unwrap();
            let store = TempMediaStore::in_dir(dir.path().join("missing"));

            let err = store.store(b"x", ".png").unwrap_err();
            assert!(matches!(err, Error::MediaWrite(_)));
        }

        #[test]
        fn release_is_idempotent() {
            let dir = tempfile::tempdir().unwrap();
            let store = TempMediaStore::in_dir(dir.path());
            let path = store.store(b"x", ".png").unwrap();

            store.release(&path).unwrap();
            assert!(!path.exists());
            store.release(&path).unwrap();
        }
    }

    mod scratch_files {
        use super::*;

        #[test]
        fn release_all_clears_every_path() {
            let dir = tempfile::tempdir().unwrap();
            let mut scratch = ScratchFiles::new(TempMediaStore::in_dir(dir.path()));

            let a = scratch.stage(b"a", ".mp4").unwrap();
            let b = scratch.stage(b"b", ".jpg").unwrap();
            assert_eq!(scratch.paths().len(), 2);

            assert_eq!(scratch.release_all(), 2);
            assert!(!a.exists());
            assert!(!b.exists());
            assert_eq!(scratch.release_all(), 0);
        }

        #[test]
        fn drop_releases_remaining_paths() {
            let dir = tempfile::tempdir().unwrap();
            let path = {
                let mut scratch = ScratchFiles::new(TempMediaStore::in_dir(dir.path()));
                scratch.stage(b"a", ".png").unwrap()
            };
            assert!(!path.exists());
        }
    }
}
