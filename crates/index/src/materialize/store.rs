//! Sinks for attachment bytes.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

/// Destination for generated attachments.
///
/// Called from blocking indexing tasks, so implementations are synchronous
/// and shared between threads.
pub trait AttachmentStore: Send + Sync {
    /// Writes `data` as `dir/name`, replacing any existing file, and returns
    /// the store-relative path written.
    fn write(&self, dir: &str, name: &str, data: &[u8]) -> Result<String>;
}

fn join(dir: &str, name: &str) -> String {
    match dir.trim_matches('/') {
        "" => name.to_string(),
        dir => format!("{dir}/{name}"),
    }
}

/// Stores attachments below a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AttachmentStore for LocalStore {
    fn write(&self, dir: &str, name: &str, data: &[u8]) -> Result<String> {
        let relative = join(dir, name);
        let path = self.root.join(&relative);
        // Parent directories are created on demand.
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).or_raise(|| ErrorKind::Io)?;
        }
        std::fs::write(&path, data).or_raise(|| ErrorKind::Io)?;
        tracing::debug!(path = %path.display(), size = data.len(), "Wrote attachment");
        Ok(relative)
    }
}

/// In-memory store for tests and dry runs.
///
/// Files live in a map behind a [`RwLock`], so writes work through `&self`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.files.read().unwrap_or_else(PoisonError::into_inner).get(path).cloned()
    }

    /// Stored paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.files.read().unwrap_or_else(PoisonError::into_inner).keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.files.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AttachmentStore for MemoryStore {
    fn write(&self, dir: &str, name: &str, data: &[u8]) -> Result<String> {
        let path = join(dir, name);
        self.files.write().unwrap_or_else(PoisonError::into_inner).insert(path.clone(), data.to_vec());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_store_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let path = store.write("unreal-tournament/map/dm-foo", "DM-Foo_shot_1.png", b"png").unwrap();
        assert_eq!(path, "unreal-tournament/map/dm-foo/DM-Foo_shot_1.png");
        assert_eq!(std::fs::read(dir.path().join(&path)).unwrap(), b"png");
    }

    #[test]
    fn test_local_store_io_error() {
        let dir = tempfile::tempdir().unwrap();
        // A file where a directory is needed.
        std::fs::write(dir.path().join("blocked"), b"").unwrap();
        let store = LocalStore::new(dir.path());
        assert_eq!(*store.write("blocked", "shot.png", b"png").unwrap_err(), ErrorKind::Io);
    }

    #[test]
    fn test_memory_store_overwrites() {
        let store = MemoryStore::new();
        store.write("/a/", "x.png", b"1").unwrap();
        store.write("a", "x.png", b"2").unwrap();
        store.write("", "y.png", b"3").unwrap();
        assert_eq!(store.paths(), vec!["a/x.png", "y.png"]);
        assert_eq!(store.get("a/x.png").as_deref(), Some(b"2".as_slice()));
    }
}
