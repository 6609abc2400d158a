//! Storage adapter contract and the two reference backends.
//!
//! Everything that reads or writes theme files goes through
//! [`StorageAdapter`]. Keys are `/`-separated strings produced by
//! [`VirtualPath`]; adapters never see raw user input.
//!
//! Two kinds of backend are supported:
//!
//! - hierarchical stores ([`FileSystemStorage`]) where folders are real and
//!   listing a file fails with [`ThemeError::NotADirectory`]
//! - flat key stores ([`MemoryStorage`]) where folders are synthesized from key
//!   prefixes and listing anything that is not a prefix yields an empty listing
//!
//! Callers must not rely on directory checks alone to tell files from folders;
//! see [`StorageCapabilities::hierarchical`].

pub mod config;
pub mod filesystem;
pub mod memory;
pub mod virtual_path;

pub use config::{StorageBackend, StorageConfig};
pub use filesystem::FileSystemStorage;
pub use memory::MemoryStorage;
pub use virtual_path::VirtualPath;

use crate::common::{ThemeError, ThemeResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

/// What a backend can and cannot do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageCapabilities {
    /// Folders exist independently of the files inside them.
    pub hierarchical: bool,
    /// Short backend name used in logs and `Unsupported` errors.
    pub backend: &'static str,
}

/// Immediate children of a folder key, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    pub folders: Vec<String>,
    pub files: Vec<String>,
}

impl DirectoryListing {
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }
}

/// Capability interface over the backing store.
///
/// # Examples
///
/// ```no_run
/// use server::storage::{MemoryStorage, StorageAdapter};
///
/// # async fn demo() -> server::common::ThemeResult<()> {
/// let storage = MemoryStorage::new();
/// storage.save("dark/templates/base.html", b"<html></html>").await?;
/// assert!(storage.exists("dark/templates/base.html").await?);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait StorageAdapter: Send + Sync + Debug {
    fn capabilities(&self) -> StorageCapabilities;

    /// Whether anything (file or folder) lives at `key`.
    async fn exists(&self, key: &str) -> ThemeResult<bool>;

    /// Read the full contents of the file at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::NotFound`] if there is no file at `key`.
    async fn open(&self, key: &str) -> ThemeResult<Vec<u8>>;

    async fn size(&self, key: &str) -> ThemeResult<u64>;

    /// Write `content` to `key`, replacing any existing file.
    async fn save(&self, key: &str, content: &[u8]) -> ThemeResult<()>;

    /// Remove the file at `key`. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> ThemeResult<()>;

    async fn list_directory(&self, key: &str) -> ThemeResult<DirectoryListing>;

    async fn modified_time(&self, key: &str) -> ThemeResult<DateTime<Utc>>;

    /// Create an empty folder. Flat backends keep the default, which refuses.
    async fn create_directory(&self, key: &str) -> ThemeResult<()> {
        let _ = key;
        Err(ThemeError::unsupported(
            "create folder",
            self.capabilities().backend,
        ))
    }
}
