use crate::error::{AssetError, Result};
use ahash::AHashMap;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Where decode functions read asset bytes from
///
/// Sources are shared with the job worker, so reads happen off the main
/// thread and must not touch thread-affine state.
pub trait AssetSource: Send + Sync {
    /// Read the whole asset `name`; a missing asset is [`AssetError::NotFound`]
    fn read(&self, name: &str) -> Result<Vec<u8>>;

    /// Whether `read(name)` would find something
    fn exists(&self, name: &str) -> bool;
}

/// Reads files from a list of root data directories, first match wins
#[derive(Clone, Debug)]
pub struct FileSource {
    roots: Vec<PathBuf>,
}

impl FileSource {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// First existing file called `name` under the roots
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        self.roots
            .iter()
            .map(|root| root.join(name))
            .find(|path| path.is_file())
    }
}

impl AssetSource for FileSource {
    fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self
            .resolve(name)
            .ok_or_else(|| AssetError::NotFound(name.to_string()))?;
        trace!(path = %path.display(), "reading asset file");
        std::fs::read(&path).map_err(|e| AssetError::Io(format!("{}: {e}", path.display())))
    }

    fn exists(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }
}

/// In-memory asset source for embedded data and tests
#[derive(Default)]
pub struct MemorySource {
    files: RwLock<AHashMap<String, Arc<[u8]>>>,
    reads: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an asset
    pub fn insert(&self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        let bytes: Vec<u8> = bytes.into();
        self.files.write().insert(name.into(), Arc::from(bytes));
    }

    pub fn remove(&self, name: &str) -> bool {
        self.files.write().remove(name).is_some()
    }

    /// Number of successful reads so far
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}

impl AssetSource for MemorySource {
    fn read(&self, name: &str) -> Result<Vec<u8>> {
        let bytes = self
            .files
            .read()
            .get(name)
            .map(|bytes| bytes.to_vec())
            .ok_or_else(|| AssetError::NotFound(name.to_string()))?;
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(bytes)
    }

    fn exists(&self, name: &str) -> bool {
        self.files.read().contains_key(name)
    }
}
