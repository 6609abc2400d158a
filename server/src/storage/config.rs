use super::{FileSystemStorage, MemoryStorage, StorageAdapter};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Which backing store to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Filesystem,
    Memory,
}

/// Storage selection, resolved once at start-up.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Backend kind (default: filesystem)
    #[serde(default)]
    backend: StorageBackend,
    /// Base directory for the filesystem backend (default: ./themes)
    root: Option<PathBuf>,
}

impl StorageConfig {
    pub fn new(backend: StorageBackend, root: Option<PathBuf>) -> Self {
        Self { backend, root }
    }

    pub fn backend(&self) -> StorageBackend {
        self.backend
    }

    pub fn root(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(|| PathBuf::from("themes"))
    }

    /// Build the adapter that every component will share.
    pub fn build(&self) -> Arc<dyn StorageAdapter> {
        match self.backend {
            StorageBackend::Filesystem => {
                let root = self.root();
                log::info!("Using filesystem storage rooted at {}", root.display());
                Arc::new(FileSystemStorage::new(root))
            }
            StorageBackend::Memory => {
                log::info!("Using in-memory storage");
                Arc::new(MemoryStorage::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StorageConfig::default();
        assert_eq!(config.backend(), StorageBackend::Filesystem);
        assert_eq!(config.root(), PathBuf::from("themes"));
        assert!(config.build().capabilities().hierarchical);
    }

    #[test]
    fn test_memory_backend() {
        let config = StorageConfig::new(StorageBackend::Memory, None);
        let storage = config.build();
        assert!(!storage.capabilities().hierarchical);
        assert_eq!(storage.capabilities().backend, "memory");
    }

    #[test]
    fn test_deserialize_backend_name() {
        let config: StorageConfig =
            serde_json::from_str(r#"{"backend": "memory", "root": "/srv/themes"}"#).unwrap();
        assert_eq!(config.backend(), StorageBackend::Memory);
        assert_eq!(config.root(), PathBuf::from("/srv/themes"));
    }
}
