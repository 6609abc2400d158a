//! Flat key/value storage kept in memory.
//!
//! Folders do not exist on their own here: a folder is any prefix shared by
//! stored keys, so listing an unknown key or a file key returns an empty
//! listing instead of an error.

use super::{DirectoryListing, StorageAdapter, StorageCapabilities};
use crate::common::{ThemeError, ThemeResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredFile {
    data: Vec<u8>,
    modified: DateTime<Utc>,
}

/// Non-hierarchical store backed by a sorted map of keys.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: Arc<RwLock<BTreeMap<String, StoredFile>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored files.
    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }
}

fn folder_prefix(key: &str) -> String {
    let trimmed = key.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    fn capabilities(&self) -> StorageCapabilities {
        StorageCapabilities {
            hierarchical: false,
            backend: "memory",
        }
    }

    async fn exists(&self, key: &str) -> ThemeResult<bool> {
        let files = self.files.read().await;
        if files.contains_key(key) {
            return Ok(true);
        }
        let prefix = folder_prefix(key);
        Ok(files
            .range(prefix.clone()..)
            .next()
            .is_some_and(|(stored, _)| stored.starts_with(&prefix)))
    }

    async fn open(&self, key: &str) -> ThemeResult<Vec<u8>> {
        let files = self.files.read().await;
        files
            .get(key)
            .map(|file| file.data.clone())
            .ok_or_else(|| ThemeError::not_found(key))
    }

    async fn size(&self, key: &str) -> ThemeResult<u64> {
        let files = self.files.read().await;
        files
            .get(key)
            .map(|file| file.data.len() as u64)
            .ok_or_else(|| ThemeError::not_found(key))
    }

    async fn save(&self, key: &str, content: &[u8]) -> ThemeResult<()> {
        let mut files = self.files.write().await;
        files.insert(
            key.to_string(),
            StoredFile {
                data: content.to_vec(),
                modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> ThemeResult<()> {
        let mut files = self.files.write().await;
        if files.remove(key).is_none() {
            log::debug!("Delete of missing key '{key}' ignored");
        }
        Ok(())
    }

    async fn list_directory(&self, key: &str) -> ThemeResult<DirectoryListing> {
        let files = self.files.read().await;
        let prefix = folder_prefix(key);

        let mut folders = BTreeSet::new();
        let mut names = Vec::new();

        for (stored, _) in files.range(prefix.clone()..) {
            let Some(rest) = stored.strip_prefix(&prefix) else {
                break;
            };
            match rest.split_once('/') {
                Some((folder, _)) => {
                    folders.insert(folder.to_string());
                }
                None if !rest.is_empty() => names.push(rest.to_string()),
                None => {}
            }
        }

        Ok(DirectoryListing {
            folders: folders.into_iter().collect(),
            files: names,
        })
    }

    async fn modified_time(&self, key: &str) -> ThemeResult<DateTime<Utc>> {
        let files = self.files.read().await;
        files
            .get(key)
            .map(|file| file.modified)
            .ok_or_else(|| ThemeError::not_found(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_synthesized_folders() {
        let storage = MemoryStorage::new();
        storage.save("t/templates/base.html", b"a").await.unwrap();
        storage.save("t/templates/partials/nav.html", b"b").await.unwrap();
        storage.save("t/robots.txt", b"c").await.unwrap();
        storage.save("tx/other.txt", b"d").await.unwrap();

        let root = storage.list_directory("t").await.unwrap();
        assert_eq!(root.folders, vec!["templates"]);
        assert_eq!(root.files, vec!["robots.txt"]);

        let templates = storage.list_directory("t/templates").await.unwrap();
        assert_eq!(templates.folders, vec!["partials"]);
        assert_eq!(templates.files, vec!["base.html"]);

        assert!(storage.exists("t/templates").await.unwrap());
        assert!(!storage.exists("t/temp").await.unwrap());
    }

    #[tokio::test]
    async fn test_listing_a_file_is_empty() {
        let storage = MemoryStorage::new();
        storage.save("t/robots.txt", b"c").await.unwrap();

        assert!(storage.list_directory("t/robots.txt").await.unwrap().is_empty());
        assert!(storage.list_directory("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_directory_is_unsupported() {
        let storage = MemoryStorage::new();
        assert!(matches!(
            storage.create_directory("t/css").await,
            Err(ThemeError::Unsupported { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_and_overwrite() {
        let storage = MemoryStorage::new();
        storage.save("t/a.txt", b"one").await.unwrap();
        storage.save("t/a.txt", b"two").await.unwrap();
        assert_eq!(storage.open("t/a.txt").await.unwrap(), b"two");
        assert_eq!(storage.len().await, 1);

        storage.delete("t/a.txt").await.unwrap();
        storage.delete("t/a.txt").await.unwrap();
        assert!(storage.is_empty().await);
        assert!(matches!(
            storage.open("t/a.txt").await,
            Err(ThemeError::NotFound { .. })
        ));
    }
}
