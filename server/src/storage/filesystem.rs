use super::{DirectoryListing, StorageAdapter, StorageCapabilities};
use crate::common::{ThemeError, ThemeResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Hierarchical storage on the local disk, rooted at a base directory.
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    base: PathBuf,
}

impl FileSystemStorage {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Map a storage key onto a path below `base`.
    ///
    /// Keys come from `VirtualPath` and are already clean; anything that would
    /// still leave the base directory is refused here as well.
    fn path_for(&self, key: &str) -> ThemeResult<PathBuf> {
        let relative = Path::new(key.trim_start_matches('/'));
        let mut path = self.base.clone();

        for component in relative.components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(ThemeError::invalid_path(
                        key,
                        "Storage key escapes the storage root",
                    ));
                }
            }
        }

        Ok(path)
    }

    async fn metadata(&self, key: &str) -> ThemeResult<std::fs::Metadata> {
        let path = self.path_for(key)?;
        fs::metadata(&path)
            .await
            .map_err(|e| ThemeError::from_io(key, e))
    }
}

#[async_trait]
impl StorageAdapter for FileSystemStorage {
    fn capabilities(&self) -> StorageCapabilities {
        StorageCapabilities {
            hierarchical: true,
            backend: "filesystem",
        }
    }

    async fn exists(&self, key: &str) -> ThemeResult<bool> {
        let path = self.path_for(key)?;
        fs::try_exists(&path)
            .await
            .map_err(|e| ThemeError::from_io(key, e))
    }

    async fn open(&self, key: &str) -> ThemeResult<Vec<u8>> {
        // Only files can be opened; a folder at `key` reads like a missing file.
        if self.metadata(key).await?.is_dir() {
            return Err(ThemeError::not_found(key));
        }
        let path = self.path_for(key)?;
        fs::read(&path).await.map_err(|e| ThemeError::from_io(key, e))
    }

    async fn size(&self, key: &str) -> ThemeResult<u64> {
        Ok(self.metadata(key).await?.len())
    }

    async fn save(&self, key: &str, content: &[u8]) -> ThemeResult<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ThemeError::from_io(key, e))?;
        }
        fs::write(&path, content)
            .await
            .map_err(|e| ThemeError::from_io(key, e))
    }

    async fn delete(&self, key: &str) -> ThemeResult<()> {
        let path = self.path_for(key)?;
        let result = match fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => fs::remove_dir(&path).await,
            Ok(_) => fs::remove_file(&path).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("Delete of missing key '{key}' ignored");
                Ok(())
            }
            Err(e) => Err(ThemeError::from_io(key, e)),
        }
    }

    async fn list_directory(&self, key: &str) -> ThemeResult<DirectoryListing> {
        if !self.metadata(key).await?.is_dir() {
            return Err(ThemeError::NotADirectory {
                key: key.to_string(),
            });
        }

        let path = self.path_for(key)?;
        let mut entries = fs::read_dir(&path)
            .await
            .map_err(|e| ThemeError::from_io(key, e))?;
        let mut listing = DirectoryListing::default();

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ThemeError::from_io(key, e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| ThemeError::from_io(key, e))?;
            if file_type.is_dir() {
                listing.folders.push(name);
            } else {
                listing.files.push(name);
            }
        }

        listing.folders.sort();
        listing.files.sort();
        Ok(listing)
    }

    async fn modified_time(&self, key: &str) -> ThemeResult<DateTime<Utc>> {
        let modified = self
            .metadata(key)
            .await?
            .modified()
            .map_err(|e| ThemeError::from_io(key, e))?;
        Ok(DateTime::<Utc>::from(modified))
    }

    async fn create_directory(&self, key: &str) -> ThemeResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&path)
            .await
            .map_err(|e| ThemeError::from_io(key, e))
    }
}
