use super::content;
use super::responses::{EditFormData, FileManagerResponse};
use super::types::{Breadcrumb, FileDetails, FileEntry, FolderEntry, ThemeSummary, UploadedFile};
use crate::common::{ThemeError, ThemeResult};
use crate::preview::Principal;
use crate::registry::{Theme, ThemeId, ThemeRegistry};
use crate::resolution::ResolutionCache;
use crate::storage::{DirectoryListing, StorageAdapter, VirtualPath};
use crate::utils::human_size;
use crate::validation::{FileNameValidator, FilePathValidator, Validator};
use std::sync::Arc;

/// Result type for file manager operations
type FileManagerResult<T> = Result<T, ThemeError>;

const NEW_FILE_NAME: &str = "new_file";
const UPLOAD_SUCCESS: &str = "Files uploaded successfully!";

/// Whether a path names a folder or a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Folder,
    File,
}

/// State shared by all file manager handlers.
#[derive(Debug, Clone)]
pub struct ThemeFiles {
    registry: Arc<dyn ThemeRegistry>,
    storage: Arc<dyn StorageAdapter>,
    cache: ResolutionCache,
    templates_dir: String,
}

impl ThemeFiles {
    pub fn new(
        registry: Arc<dyn ThemeRegistry>,
        storage: Arc<dyn StorageAdapter>,
        cache: ResolutionCache,
        templates_dir: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            storage,
            cache,
            templates_dir: templates_dir.into(),
        }
    }

    pub async fn theme(&self, id: ThemeId) -> ThemeResult<Theme> {
        self.registry.get_theme(id).await
    }

    /// Decide whether `path` is a folder or a file.
    ///
    /// The theme root is always a folder. Hierarchical backends are trusted to
    /// report `NotADirectory`; on flat backends a non-empty listing means
    /// folder and an empty listing of an existing key means file.
    pub async fn entry_kind(&self, path: &VirtualPath) -> ThemeResult<EntryKind> {
        if path.is_root() {
            return Ok(EntryKind::Folder);
        }

        if self.storage.capabilities().hierarchical {
            return match self.storage.list_directory(path.key()).await {
                Ok(_) => Ok(EntryKind::Folder),
                Err(ThemeError::NotADirectory { .. }) => Ok(EntryKind::File),
                Err(e) => Err(e),
            };
        }

        let listing = self.storage.list_directory(path.key()).await?;
        if !listing.is_empty() {
            Ok(EntryKind::Folder)
        } else if self.storage.exists(path.key()).await? {
            Ok(EntryKind::File)
        } else {
            Err(ThemeError::not_found(path.relative()))
        }
    }

    /// Listing of a folder; a missing theme root lists as empty.
    async fn listing(&self, path: &VirtualPath) -> ThemeResult<DirectoryListing> {
        match self.storage.list_directory(path.key()).await {
            Err(ThemeError::NotFound { .. }) if path.is_root() => Ok(DirectoryListing::default()),
            other => other,
        }
    }

    pub async fn file_details(&self, path: &VirtualPath) -> ThemeResult<FileDetails> {
        let data = self.storage.open(path.key()).await?;
        let modified = self.storage.modified_time(path.key()).await?;
        let size = data.len() as u64;
        let sniffed = content::sniff(data);

        Ok(FileDetails {
            name: path.file_name().unwrap_or_default().to_string(),
            path: path.relative().to_string(),
            extension: path.extension().map(str::to_string),
            size,
            size_display: human_size(size),
            modified,
            kind: sniffed.kind,
            lines: sniffed.lines,
            text: sniffed.text,
            data_uri: sniffed.data_uri,
        })
    }

    /// Drop cached resolutions when a write lands in the templates folder.
    pub async fn notify_write(&self, path: &VirtualPath) {
        if path.strip_dir(&self.templates_dir).is_some() {
            log::debug!("Write to '{}' touches templates, clearing resolution cache", path.key());
            self.cache.invalidate_all().await;
        }
    }

    pub fn storage(&self) -> &Arc<dyn StorageAdapter> {
        &self.storage
    }
}

/// Root crumb named after the theme, then one crumb per path segment.
pub fn breadcrumbs(theme: &Theme, path: &VirtualPath) -> Vec<Breadcrumb> {
    let mut crumbs = vec![Breadcrumb {
        name: theme.name.clone(),
        path: String::new(),
    }];

    let mut current = String::new();
    for segment in path.relative().split('/').filter(|s| !s.is_empty()) {
        if !current.is_empty() {
            current.push('/');
        }
        current.push_str(segment);
        crumbs.push(Breadcrumb {
            name: segment.to_string(),
            path: current.clone(),
        });
    }

    crumbs
}

fn folder_path(theme: &Theme, folder: &str) -> ThemeResult<VirtualPath> {
    VirtualPath::resolve(&theme.path, folder)
}

fn file_path(theme: &Theme, path: &str) -> ThemeResult<VirtualPath> {
    VirtualPath::resolve_file(&theme.path, path)
}

/// Handles viewing commands
pub struct BrowseCommandHandler {
    files: ThemeFiles,
}

impl BrowseCommandHandler {
    pub fn new(files: ThemeFiles) -> Self {
        Self { files }
    }

    pub async fn handle_browse(
        &self,
        theme: &Theme,
        path: String,
    ) -> FileManagerResult<FileManagerResponse> {
        let resolved = folder_path(theme, &path)?;
        match self.files.entry_kind(&resolved).await? {
            EntryKind::Folder => self.list(theme, resolved).await,
            EntryKind::File => self.read(theme, resolved).await,
        }
    }

    pub async fn handle_read_file(
        &self,
        theme: &Theme,
        path: String,
    ) -> FileManagerResult<FileManagerResponse> {
        self.read(theme, file_path(theme, &path)?).await
    }

    pub async fn handle_list_folder(
        &self,
        theme: &Theme,
        path: String,
    ) -> FileManagerResult<FileManagerResponse> {
        self.list(theme, folder_path(theme, &path)?).await
    }

    async fn read(
        &self,
        theme: &Theme,
        path: VirtualPath,
    ) -> FileManagerResult<FileManagerResponse> {
        let file = self.files.file_details(&path).await?;
        Ok(FileManagerResponse::FileView {
            theme: ThemeSummary::from(theme),
            breadcrumbs: breadcrumbs(theme, &path),
            file,
        })
    }

    async fn list(
        &self,
        theme: &Theme,
        path: VirtualPath,
    ) -> FileManagerResult<FileManagerResponse> {
        let listing = self.files.listing(&path).await?;

        let mut folders = Vec::with_capacity(listing.folders.len() + 1);
        if let Some(parent) = path.parent() {
            folders.push(FolderEntry {
                name: "..".to_string(),
                path: parent.relative().to_string(),
            });
        }
        for name in listing.folders {
            let child = path.join(&name)?;
            folders.push(FolderEntry {
                name,
                path: child.relative().to_string(),
            });
        }

        let storage = self.files.storage();
        let mut files = Vec::with_capacity(listing.files.len());
        for name in listing.files {
            let child = path.join(&name)?;
            let size = storage.size(child.key()).await?;
            let modified = storage.modified_time(child.key()).await?;
            files.push(FileEntry {
                name,
                path: child.relative().to_string(),
                size,
                size_display: human_size(size),
                modified,
            });
        }

        Ok(FileManagerResponse::FolderListing {
            theme: ThemeSummary::from(theme),
            path: path.relative().to_string(),
            breadcrumbs: breadcrumbs(theme, &path),
            folders,
            files,
        })
    }
}

/// Handles edit, create and delete commands
pub struct EditCommandHandler {
    files: ThemeFiles,
}

impl EditCommandHandler {
    pub fn new(files: ThemeFiles) -> Self {
        Self { files }
    }

    pub async fn handle_edit_form(
        &self,
        theme: &Theme,
        path: String,
    ) -> FileManagerResult<FileManagerResponse> {
        let resolved = file_path(theme, &path)?;
        let file = self.files.file_details(&resolved).await?;

        Ok(FileManagerResponse::EditForm {
            theme: ThemeSummary::from(theme),
            breadcrumbs: breadcrumbs(theme, &resolved),
            form: EditFormData {
                path: resolved.relative().to_string(),
                content: file.text.clone().unwrap_or_default(),
            },
            file,
        })
    }

    pub async fn handle_save_file(
        &self,
        theme: &Theme,
        principal: &Principal,
        path: String,
        new_path: Option<String>,
        content: String,
    ) -> FileManagerResult<FileManagerResponse> {
        let source = file_path(theme, &path)?;
        let target = match new_path {
            Some(new_path) => {
                FilePathValidator.validate(&new_path)?;
                file_path(theme, &new_path)?
            }
            None => source.clone(),
        };
        let renamed = target != source;

        self.files.storage().save(target.key(), content.as_bytes()).await?;
        self.files.notify_write(&target).await;

        let message = if renamed {
            // Only remove the old file once the new one is safely written.
            self.files.storage().delete(source.key()).await?;
            self.files.notify_write(&source).await;
            log::info!(
                "{principal} renamed '{}' to '{}' in theme '{}'",
                source.relative(),
                target.relative(),
                theme.name
            );
            format!("File '{}' saved and renamed successfully!", target.relative())
        } else {
            log::info!("{principal} saved '{}' in theme '{}'", target.relative(), theme.name);
            format!("File '{}' saved successfully!", target.relative())
        };

        Ok(FileManagerResponse::Redirect {
            theme_id: theme.id,
            path: target.relative().to_string(),
            message,
        })
    }

    pub async fn handle_confirm_delete(
        &self,
        theme: &Theme,
        path: String,
    ) -> FileManagerResult<FileManagerResponse> {
        let resolved = file_path(theme, &path)?;
        let file = self.files.file_details(&resolved).await?;

        Ok(FileManagerResponse::DeleteConfirmation {
            theme: ThemeSummary::from(theme),
            breadcrumbs: breadcrumbs(theme, &resolved),
            file,
        })
    }

    pub async fn handle_delete_file(
        &self,
        theme: &Theme,
        principal: &Principal,
        path: String,
    ) -> FileManagerResult<FileManagerResponse> {
        let resolved = file_path(theme, &path)?;

        self.files.storage().delete(resolved.key()).await?;
        self.files.notify_write(&resolved).await;
        log::info!("{principal} deleted '{}' from theme '{}'", resolved.relative(), theme.name);

        Ok(FileManagerResponse::Redirect {
            theme_id: theme.id,
            path: String::new(),
            message: format!("File '{}' deleted successfully!", resolved.relative()),
        })
    }

    pub async fn handle_new_file_form(
        &self,
        theme: &Theme,
        folder: String,
    ) -> FileManagerResult<FileManagerResponse> {
        let resolved = folder_path(theme, &folder)?;
        let suggested = resolved.join(NEW_FILE_NAME)?;

        Ok(FileManagerResponse::NewFileForm {
            theme: ThemeSummary::from(theme),
            breadcrumbs: breadcrumbs(theme, &resolved),
            form: EditFormData {
                path: suggested.relative().to_string(),
                content: String::new(),
            },
        })
    }

    pub async fn handle_create_file(
        &self,
        theme: &Theme,
        principal: &Principal,
        path: String,
        content: String,
    ) -> FileManagerResult<FileManagerResponse> {
        FilePathValidator.validate(&path)?;
        let resolved = file_path(theme, &path)?;

        if self.files.storage().exists(resolved.key()).await? {
            return Err(ThemeError::AlreadyExists {
                key: resolved.relative().to_string(),
            });
        }

        self.files.storage().save(resolved.key(), content.as_bytes()).await?;
        self.files.notify_write(&resolved).await;
        log::info!("{principal} created '{}' in theme '{}'", resolved.relative(), theme.name);

        Ok(FileManagerResponse::Redirect {
            theme_id: theme.id,
            path: resolved.relative().to_string(),
            message: format!("File '{}' saved successfully!", resolved.relative()),
        })
    }

    pub async fn handle_create_folder(
        &self,
        theme: &Theme,
        principal: &Principal,
        path: String,
    ) -> FileManagerResult<FileManagerResponse> {
        let capabilities = self.files.storage().capabilities();
        if !capabilities.hierarchical {
            return Err(ThemeError::unsupported("create folder", capabilities.backend));
        }

        let resolved = folder_path(theme, &path)?;
        if resolved.is_root() {
            return Err(ThemeError::invalid_path(path, "A folder name is required."));
        }
        if self.files.storage().exists(resolved.key()).await? {
            return Err(ThemeError::AlreadyExists {
                key: resolved.relative().to_string(),
            });
        }

        self.files.storage().create_directory(resolved.key()).await?;
        log::info!("{principal} created folder '{}' in theme '{}'", resolved.relative(), theme.name);

        Ok(FileManagerResponse::Redirect {
            theme_id: theme.id,
            path: resolved.relative().to_string(),
            message: format!("Folder '{}' created successfully!", resolved.relative()),
        })
    }
}

/// Handles upload commands
pub struct UploadCommandHandler {
    files: ThemeFiles,
}

impl UploadCommandHandler {
    pub fn new(files: ThemeFiles) -> Self {
        Self { files }
    }

    pub async fn handle_upload_form(
        &self,
        theme: &Theme,
        folder: String,
    ) -> FileManagerResult<FileManagerResponse> {
        let resolved = folder_path(theme, &folder)?;
        Ok(FileManagerResponse::UploadForm {
            theme: ThemeSummary::from(theme),
            breadcrumbs: breadcrumbs(theme, &resolved),
            folder: resolved.relative().to_string(),
        })
    }

    pub async fn handle_upload(
        &self,
        theme: &Theme,
        principal: &Principal,
        folder: String,
        files: Vec<UploadedFile>,
    ) -> FileManagerResult<FileManagerResponse> {
        let resolved = self.store_uploads(theme, principal, &folder, files).await?;
        Ok(FileManagerResponse::Redirect {
            theme_id: theme.id,
            path: resolved.relative().to_string(),
            message: UPLOAD_SUCCESS.to_string(),
        })
    }

    /// Upload with a JSON envelope. Failures never escape as errors.
    pub async fn handle_upload_ajax(
        &self,
        theme: &Theme,
        principal: &Principal,
        folder: String,
        files: Vec<UploadedFile>,
    ) -> FileManagerResult<FileManagerResponse> {
        match self.store_uploads(theme, principal, &folder, files).await {
            Ok(_) => Ok(FileManagerResponse::json_ok(UPLOAD_SUCCESS)),
            Err(e) => {
                log::error!("Upload to '{folder}' in theme '{}' failed: {e}", theme.name);
                Ok(FileManagerResponse::json_error(500, e.user_message()))
            }
        }
    }

    async fn store_uploads(
        &self,
        theme: &Theme,
        principal: &Principal,
        folder: &str,
        files: Vec<UploadedFile>,
    ) -> FileManagerResult<VirtualPath> {
        let resolved = folder_path(theme, folder)?;

        // Validate every name before writing anything.
        let targets = files
            .into_iter()
            .map(|file| -> FileManagerResult<(VirtualPath, Vec<u8>)> {
                FileNameValidator.validate(&file.name)?;
                Ok((resolved.join(&file.name)?, file.content))
            })
            .collect::<FileManagerResult<Vec<_>>>()?;

        for (target, content) in targets {
            if self.files.storage().exists(target.key()).await? {
                log::warn!("Upload overwrites existing file '{}'", target.relative());
            }
            self.files.storage().save(target.key(), &content).await?;
            self.files.notify_write(&target).await;
            log::info!(
                "{principal} uploaded '{}' ({}) to theme '{}'",
                target.relative(),
                human_size(content.len() as u64),
                theme.name
            );
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{InMemoryThemeRegistry, NewTheme};
    use crate::storage::MemoryStorage;

    #[test]
    fn test_breadcrumbs() {
        let theme = Theme {
            id: ThemeId::new(),
            name: "Dark".to_string(),
            author: String::new(),
            version: String::new(),
            order: 0,
            is_active: true,
            path: "dark".to_string(),
            description: String::new(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let root = VirtualPath::resolve("dark", "").unwrap();
        assert_eq!(breadcrumbs(&theme, &root).len(), 1);

        let nested = VirtualPath::resolve("dark", "templates/partials/nav.html").unwrap();
        let crumbs = breadcrumbs(&theme, &nested);
        let names: Vec<_> = crumbs.iter().map(|c| c.name.as_str()).collect();
        let paths: Vec<_> = crumbs.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(names, vec!["Dark", "templates", "partials", "nav.html"]);
        assert_eq!(
            paths,
            vec!["", "templates", "templates/partials", "templates/partials/nav.html"]
        );
    }

    #[tokio::test]
    async fn test_flat_entry_kind() {
        let registry = InMemoryThemeRegistry::new();
        let storage = Arc::new(MemoryStorage::new());
        let files = ThemeFiles::new(
            Arc::new(registry.clone()),
            storage.clone(),
            ResolutionCache::default(),
            "templates",
        );
        let theme = registry.insert(NewTheme::new("t", "t")).await.unwrap();
        storage.save("t/templates/base.html", b"x").await.unwrap();

        let kind = |p: &str| VirtualPath::resolve(&theme.path, p).unwrap();
        assert_eq!(files.entry_kind(&kind("")).await.unwrap(), EntryKind::Folder);
        assert_eq!(files.entry_kind(&kind("templates")).await.unwrap(), EntryKind::Folder);
        assert_eq!(
            files.entry_kind(&kind("templates/base.html")).await.unwrap(),
            EntryKind::File
        );
        assert!(matches!(
            files.entry_kind(&kind("missing")).await,
            Err(ThemeError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_notify_write_only_for_templates() {
        let cache = ResolutionCache::default();
        let files = ThemeFiles::new(
            Arc::new(InMemoryThemeRegistry::new()),
            Arc::new(MemoryStorage::new()),
            cache.clone(),
            "templates",
        );

        let before = cache.generation();
        files
            .notify_write(&VirtualPath::resolve("t", "static/site.css").unwrap())
            .await;
        assert_eq!(cache.generation(), before);

        files
            .notify_write(&VirtualPath::resolve("t", "templates/base.html").unwrap())
            .await;
        assert_eq!(cache.generation(), before + 1);
    }
}
