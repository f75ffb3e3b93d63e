//! Raw string key-value backends.

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tempfile::NamedTempFile;
use crate::{Result, StorefrontError};

/// Host storage holding one serialized value per key.
pub trait KeyValueBackend: Send + Sync {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local storage, one per test or run.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self { Self::default() }
}

impl KeyValueBackend for MemoryBackend {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|e| StorefrontError::Storage(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|e| StorefrontError::Storage(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| StorefrontError::Storage(format!("{}: {e}", dir.display())))?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> PathBuf { self.dir.join(format!("{key}.json")) }
}

impl KeyValueBackend for FileBackend {
    fn read(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path(key)) {
            Ok(raw) => Some(raw),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read store file");
                None
            }
        }
    }

    /// Writes through a uniquely named temp file in the same directory, then
    /// renames it over the key's file.
    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path(key);
        let storage_err = |e: std::io::Error| StorefrontError::Storage(format!("{}: {e}", path.display()));
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(storage_err)?;
        tmp.write_all(value.as_bytes()).map_err(storage_err)?;
        tmp.persist(&path).map_err(|e| storage_err(e.error))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorefrontError::Storage(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.read("k"), None);
        backend.write("k", "[1]").unwrap();
        assert_eq!(backend.read("k").as_deref(), Some("[1]"));
        backend.remove("k").unwrap();
        backend.remove("k").unwrap();
        assert_eq!(backend.read("k"), None);
    }

    #[test]
    fn test_file_backend_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        FileBackend::open(dir.path()).unwrap().write("hb_cart", "[]").unwrap();
        let reopened = FileBackend::open(dir.path()).unwrap();
        assert_eq!(reopened.read("hb_cart").as_deref(), Some("[]"));
        assert!(dir.path().join("hb_cart.json").exists());
        reopened.remove("hb_cart").unwrap();
        assert_eq!(reopened.read("hb_cart"), None);
    }

    #[test]
    fn test_file_backend_concurrent_writes_to_one_key() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        std::thread::scope(|s| {
            for t in 0..8 {
                let backend = &backend;
                s.spawn(move || {
                    for i in 0..20 {
                        backend.write("hb_orders", &format!("[{t}, {i}]")).unwrap();
                    }
                });
            }
        });
        let raw = backend.read("hb_orders").unwrap();
        assert!(serde_json::from_str::<Vec<u32>>(&raw).is_ok());
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
