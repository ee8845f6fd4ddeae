//! Key-value text store backing the sync cache.
//!
//! Implementations:
//! - `FileStore` - one UTF-8 file per logical name under a data directory
//! - `InMemoryStore` - for testing

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::debug;
use crate::error::StoreError;

pub trait PersistentStore: Send + Sync {
    fn exists(&self, name: &str) -> bool;

    /// Fails with `StoreError::NotFound` when `name` is absent.
    fn read_text(&self, name: &str) -> Result<String, StoreError>;

    fn write_text(&self, name: &str, content: &str) -> Result<(), StoreError>;

    /// Removing an absent name is not an error.
    fn remove(&self, name: &str) -> Result<(), StoreError>;
}

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            name: root.display().to_string(),
            source,
        })?;
        Ok(Self { root })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl PersistentStore for FileStore {
    fn exists(&self, name: &str) -> bool {
        self.path(name).is_file()
    }

    fn read_text(&self, name: &str) -> Result<String, StoreError> {
        std::fs::read_to_string(self.path(name)).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(name.to_string())
            } else {
                StoreError::Io {
                    name: name.to_string(),
                    source,
                }
            }
        })
    }

    fn write_text(&self, name: &str, content: &str) -> Result<(), StoreError> {
        let path = self.path(name);
        let io_err = |source| StoreError::Io {
            name: name.to_string(),
            source,
        };

        // Atomic write: write to temp file, then rename
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, content).map_err(io_err)?;
        std::fs::rename(&temp_path, &path).map_err(io_err)?;

        debug!("Stored {} ({} bytes)", name, content.len());
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                name: name.to_string(),
                source,
            }),
        }
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    files: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistentStore for InMemoryStore {
    fn exists(&self, name: &str) -> bool {
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        files.contains_key(name)
    }

    fn read_text(&self, name: &str) -> Result<String, StoreError> {
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        files
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn write_text(&self, name: &str, content: &str) -> Result<(), StoreError> {
        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());
        files.insert(name.to_string(), content.to_string());
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), StoreError> {
        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());
        files.remove(name);
        Ok(())
    }
}
