//! Temporary assets created by the upload layer.
//!
//! A [`TemporaryAssetHandle`] owns one transient resource for the duration of
//! a single pipeline invocation. Disposal is idempotent and never fails
//! observably: a resource that is already gone is treated as disposed, and
//! any other removal error is logged.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

/// Storage backing a temporary asset.
pub trait TemporaryAsset: Send + Sync + fmt::Debug {
    /// Opaque identifier of the resource, used in logs and errors.
    fn location(&self) -> String;

    /// Reads the full content of the resource.
    fn read_bytes(&self) -> io::Result<Vec<u8>>;

    /// Removes the resource. Returns `NotFound` if it is already gone.
    fn remove(&self) -> io::Result<()>;
}

/// A temporary file on disk.
#[derive(Debug)]
pub struct DiskAsset {
    path: PathBuf,
}

impl DiskAsset {
    /// Wraps an existing file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TemporaryAsset for DiskAsset {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn read_bytes(&self) -> io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }

    fn remove(&self) -> io::Result<()> {
        std::fs::remove_file(&self.path)
    }
}

/// A temporary buffer held in memory.
#[derive(Debug)]
pub struct MemoryAsset {
    label: String,
    bytes: Mutex<Option<Vec<u8>>>,
}

impl MemoryAsset {
    /// Creates an in-memory asset holding `bytes`.
    pub fn new(label: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            label: label.into(),
            bytes: Mutex::new(Some(bytes.into())),
        }
    }

    fn gone(&self) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("memory asset {} was removed", self.label),
        )
    }
}

impl TemporaryAsset for MemoryAsset {
    fn location(&self) -> String {
        format!("memory:{}", self.label)
    }

    fn read_bytes(&self) -> io::Result<Vec<u8>> {
        let guard = self.bytes.lock().unwrap_or_else(|e| e.into_inner());
        guard.clone().ok_or_else(|| self.gone())
    }

    fn remove(&self) -> io::Result<()> {
        let mut guard = self.bytes.lock().unwrap_or_else(|e| e.into_inner());
        match guard.take() {
            Some(_) => Ok(()),
            None => Err(self.gone()),
        }
    }
}

/// Exclusive ownership of a temporary asset.
///
/// Dropping a handle that was never disposed disposes it.
pub struct TemporaryAssetHandle {
    asset: Box<dyn TemporaryAsset>,
    disposed: bool,
}

impl TemporaryAssetHandle {
    /// Takes ownership of a custom asset store.
    pub fn new(asset: Box<dyn TemporaryAsset>) -> Self {
        Self {
            asset,
            disposed: false,
        }
    }

    /// Takes ownership of a file on disk.
    pub fn disk(path: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(DiskAsset::new(path)))
    }

    /// Takes ownership of an in-memory buffer.
    pub fn memory(label: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(Box::new(MemoryAsset::new(label, bytes)))
    }

    /// Opaque identifier of the underlying resource.
    pub fn location(&self) -> String {
        self.asset.location()
    }

    /// Whether [`dispose`](Self::dispose) has already run.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Reads the full content of the asset.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the handle is disposed, or any error from the
    /// backing store.
    pub fn read_bytes(&self) -> io::Result<Vec<u8>> {
        if self.disposed {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("asset {} is already disposed", self.location()),
            ));
        }
        self.asset.read_bytes()
    }

    /// Releases the underlying resource. Safe to call any number of times.
    ///
    /// Removal is synchronous. On the async runtime this is a single
    /// `remove_file` call per upload, run on the request's worker thread.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        match self.asset.remove() {
            Ok(()) => debug!(location = %self.asset.location(), "temporary asset disposed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(location = %self.asset.location(), "temporary asset already gone")
            }
            Err(e) => warn!(
                location = %self.asset.location(),
                error = %e,
                "failed to dispose temporary asset"
            ),
        }
    }
}

impl fmt::Debug for TemporaryAssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporaryAssetHandle")
            .field("location", &self.asset.location())
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl Drop for TemporaryAssetHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Creates uniquely named temporary files for uploaded content.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Uses `dir` for uploads, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory uploads are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates an empty file and returns it with the handle that owns it.
    pub fn create(&self) -> io::Result<(tokio::fs::File, TemporaryAssetHandle)> {
        let (file, path) = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(&self.dir)?
            .keep()
            .map_err(|e| e.error)?;

        Ok((
            tokio::fs::File::from_std(file),
            TemporaryAssetHandle::disk(path),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct FailingRemove(Arc<AtomicUsize>);

    impl TemporaryAsset for FailingRemove {
        fn location(&self) -> String {
            "failing".into()
        }

        fn read_bytes(&self) -> io::Result<Vec<u8>> {
            Ok(Vec::new())
        }

        fn remove(&self) -> io::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    #[test]
    fn disk_asset_is_removed_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.bin");
        std::fs::write(&path, b"payload").unwrap();

        let mut handle = TemporaryAssetHandle::disk(&path);
        assert_eq!(handle.read_bytes().unwrap(), b"payload");

        handle.dispose();
        assert!(!path.exists());
        assert!(handle.is_disposed());

        handle.dispose();
        assert!(handle.read_bytes().is_err());
    }

    #[test]
    fn disposing_missing_file_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let mut handle = TemporaryAssetHandle::disk(dir.path().join("never-written"));
        handle.dispose();
        assert!(handle.is_disposed());
    }

    #[test]
    fn removal_errors_are_swallowed_and_not_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut handle = TemporaryAssetHandle::new(Box::new(FailingRemove(calls.clone())));

        handle.dispose();
        handle.dispose();
        drop(handle);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_disposes_live_handle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dropped.bin");
        std::fs::write(&path, b"x").unwrap();

        drop(TemporaryAssetHandle::disk(&path));
        assert!(!path.exists());
    }

    #[test]
    fn memory_asset_reads_until_removed() {
        let asset = MemoryAsset::new("clip", vec![1, 2, 3]);
        assert_eq!(asset.read_bytes().unwrap(), vec![1, 2, 3]);
        asset.remove().unwrap();
        assert_eq!(asset.read_bytes().unwrap_err().kind(), io::ErrorKind::NotFound);
        assert_eq!(asset.remove().unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn upload_store_creates_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().join("uploads")).unwrap();

        let (_a, first) = store.create().unwrap();
        let (_b, second) = store.create().unwrap();

        assert_ne!(first.location(), second.location());
        assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 2);

        drop(first);
        drop(second);
        assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 0);
    }
}
