use crate::cli::{Command, ContentSource};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use server::engine::ThemeEngine;
use server::file_manager::{
    ContentKind, FileDetails, FileManagerCommand, FileManagerResponse, UploadedFile,
};
use server::preview::Principal;
use server::registry::{InMemoryThemeRegistry, Theme, ThemeId, ThemeRegistry};
use server::resolution::ResolvedTemplate;
use server::storage::{StorageAdapter, StorageBackend};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// A configured engine plus the identity commands run as.
pub struct App {
    engine: ThemeEngine,
    registry: InMemoryThemeRegistry,
    principal: Principal,
}

impl App {
    /// Build storage, register the configured themes and wire the engine.
    pub async fn from_config(config: &AppConfig, principal: Principal) -> AppResult<Self> {
        let storage = config.storage().build();
        if config.storage().backend() == StorageBackend::Memory {
            log::warn!("Memory storage starts empty and is discarded when the command exits");
        }

        let registry = InMemoryThemeRegistry::new();
        for seed in config.themes() {
            registry.insert(seed.to_new_theme()).await?;
        }
        log::debug!("Registered {} configured theme(s)", config.themes().len());

        let engine = ThemeEngine::new(config.engine(), storage, Arc::new(registry.clone()));
        Ok(Self {
            engine,
            registry,
            principal,
        })
    }

    pub fn engine(&self) -> &ThemeEngine {
        &self.engine
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Run one command and return what should be printed.
    pub async fn run(&self, command: Command) -> AppResult<String> {
        match command {
            Command::Themes { all, json } => self.list_themes(all, json).await,
            Command::Resolve {
                name,
                preview,
                static_file,
                candidates,
            } => {
                self.start_preview(&preview).await?;
                if candidates {
                    self.candidates(&name).await
                } else {
                    self.resolve(&name, static_file).await
                }
            }
            Command::Ls { theme, path } => {
                self.file_command(&theme, FileManagerCommand::Browse { path })
                    .await
            }
            Command::Cat { theme, path } => {
                self.file_command(&theme, FileManagerCommand::ReadFile { path })
                    .await
            }
            Command::New {
                theme,
                path,
                source,
            } => {
                let content = read_source(&source).await?.unwrap_or_default();
                self.file_command(&theme, FileManagerCommand::CreateFile { path, content })
                    .await
            }
            Command::Edit {
                theme,
                path,
                rename,
                source,
            } => {
                let content = match read_source(&source).await? {
                    Some(content) => content,
                    None => self.current_text(&theme, &path).await?,
                };
                self.file_command(
                    &theme,
                    FileManagerCommand::SaveFile {
                        path,
                        new_path: rename,
                        content,
                    },
                )
                .await
            }
            Command::Rm { theme, path } => {
                self.file_command(&theme, FileManagerCommand::DeleteFile { path })
                    .await
            }
            Command::Upload {
                theme,
                folder,
                files,
            } => {
                let mut uploads = Vec::with_capacity(files.len());
                for file in &files {
                    uploads.push(read_upload(file).await?);
                }
                self.file_command(
                    &theme,
                    FileManagerCommand::UploadFiles {
                        folder,
                        files: uploads,
                    },
                )
                .await
            }
            Command::Mkdir { theme, path } => {
                self.file_command(&theme, FileManagerCommand::CreateFolder { path })
                    .await
            }
        }
    }

    /// Look a theme up by name, falling back to its id.
    pub async fn find_theme(&self, key: &str) -> AppResult<Theme> {
        if let Some(theme) = self.registry.find_by_name(key).await {
            return Ok(theme);
        }
        match key.parse::<ThemeId>() {
            Ok(id) => Ok(self.registry.get_theme(id).await?),
            Err(_) => Err(AppError::UnknownTheme(key.to_string())),
        }
    }

    async fn list_themes(&self, all: bool, json: bool) -> AppResult<String> {
        let themes = if all {
            self.registry.all().await
        } else {
            self.registry.list_themes(&HashSet::new()).await?
        };

        if json {
            return Ok(serde_json::to_string_pretty(&themes)?);
        }

        let lines: Vec<String> = themes
            .iter()
            .map(|theme| {
                format!(
                    "{:>5}  {:<20} {:<24} {}{}",
                    theme.order,
                    theme.name,
                    theme.path,
                    theme.id,
                    if theme.is_active { "" } else { "  (inactive)" }
                )
            })
            .collect();
        Ok(lines.join("\n"))
    }

    async fn start_preview(&self, names: &[String]) -> AppResult<()> {
        if names.is_empty() {
            return Ok(());
        }

        let mut ids = HashSet::new();
        for name in names {
            ids.insert(self.find_theme(name).await?.id);
        }
        self.engine.preview_themes(&self.principal, ids).await?;
        Ok(())
    }

    async fn resolve(&self, name: &str, static_file: bool) -> AppResult<String> {
        let resolved = if static_file {
            self.engine.resolve_static(name, Some(&self.principal)).await?
        } else {
            self.engine
                .resolve_template(name, Some(&self.principal))
                .await?
        };
        Ok(render_resolved(&resolved))
    }

    async fn candidates(&self, name: &str) -> AppResult<String> {
        let candidates = self.engine.candidates(name, Some(&self.principal)).await?;

        let mut lines = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            let present = self.engine.storage().exists(&candidate.storage_key).await?;
            lines.push(format!("{} {candidate}", if present { "*" } else { " " }));
        }
        Ok(lines.join("\n"))
    }

    async fn current_text(&self, theme: &str, path: &str) -> AppResult<String> {
        let response = self
            .execute(
                theme,
                FileManagerCommand::EditForm {
                    path: path.to_string(),
                },
            )
            .await?;

        match response {
            FileManagerResponse::EditForm { file, form, .. } if file.text.is_some() => {
                Ok(form.content)
            }
            FileManagerResponse::Error { error } => Err(error.into()),
            _ => Err(AppError::Usage(format!(
                "'{path}' is not a text file; pass --content or --from to replace it"
            ))),
        }
    }

    async fn file_command(&self, theme: &str, command: FileManagerCommand) -> AppResult<String> {
        let response = self.execute(theme, command).await?;
        render(response)
    }

    async fn execute(
        &self,
        theme: &str,
        command: FileManagerCommand,
    ) -> AppResult<FileManagerResponse> {
        let theme = self.find_theme(theme).await?;
        Ok(self
            .engine
            .file_manager()
            .execute_command(theme.id, &self.principal, command)
            .await)
    }
}

async fn read_source(source: &ContentSource) -> AppResult<Option<String>> {
    if let Some(content) = &source.content {
        return Ok(Some(content.clone()));
    }
    match &source.from {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .map(Some)
            .map_err(|source| AppError::Io {
                path: path.clone(),
                source,
            }),
        None => Ok(None),
    }
}

async fn read_upload(path: &Path) -> AppResult<UploadedFile> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| AppError::Usage(format!("'{}' is not a file", path.display())))?;
    let content = tokio::fs::read(path).await.map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(UploadedFile::new(name, content))
}

fn render(response: FileManagerResponse) -> AppResult<String> {
    match response {
        FileManagerResponse::FolderListing {
            theme,
            path,
            folders,
            files,
            ..
        } => {
            let mut lines = vec![format!("{}:/{}", theme.name, path)];
            lines.extend(folders.iter().map(|folder| format!("  {}/", folder.name)));
            lines.extend(files.iter().map(|file| {
                format!(
                    "  {:<32} {:>10}  {}",
                    file.name,
                    file.size_display,
                    file.modified.format("%Y-%m-%d %H:%M")
                )
            }));
            Ok(lines.join("\n"))
        }
        FileManagerResponse::FileView { file, .. }
        | FileManagerResponse::DeleteConfirmation { file, .. } => Ok(render_file(&file)),
        FileManagerResponse::EditForm { form, .. } => Ok(form.content),
        FileManagerResponse::NewFileForm { form, .. } => Ok(form.path),
        FileManagerResponse::UploadForm { folder, .. } => Ok(folder),
        FileManagerResponse::Redirect { message, .. } => Ok(message),
        FileManagerResponse::Json { body, .. } => Ok(body.to_string()),
        FileManagerResponse::Error { error } => Err(error.into()),
    }
}

fn render_file(file: &FileDetails) -> String {
    match (&file.kind, &file.text) {
        (ContentKind::Text, Some(text)) => text.clone(),
        (ContentKind::Image(format), _) => format!(
            "{}: {} image, {}",
            file.name,
            format.mime_type(),
            file.size_display
        ),
        _ => format!("{}: {} file, {}", file.name, file.filetype(), file.size_display),
    }
}

fn render_resolved(resolved: &ResolvedTemplate) -> String {
    let header = format!(
        "{} -> {} ({})",
        resolved.name, resolved.origin.theme_name, resolved.origin.storage_key
    );
    match resolved.as_text() {
        Some(text) => format!("{header}\n\n{text}"),
        None => format!("{header}\n\n<{} bytes of binary content>", resolved.contents.len()),
    }
}
