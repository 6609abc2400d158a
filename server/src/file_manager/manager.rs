use super::command_handlers::{
    BrowseCommandHandler, EditCommandHandler, ThemeFiles, UploadCommandHandler,
};
use super::commands::FileManagerCommand;
use super::responses::FileManagerResponse;
use super::routing::{EditorAction, EditorRequest};
use crate::common::{ThemeError, ThemeResult};
use crate::preview::Principal;
use crate::registry::ThemeId;

/// Entry point for theme file editing.
///
/// Commands are dispatched to specialised handlers. Errors never escape:
/// they are logged and turned into [`FileManagerResponse::Error`], or into a
/// JSON error envelope for the asynchronous upload endpoint.
///
/// # Examples
///
/// ```no_run
/// use server::file_manager::{FileManagerCommand, FileManagerResponse};
///
/// # async fn demo(engine: &server::engine::ThemeEngine, theme: server::registry::ThemeId) {
/// let principal = server::preview::Principal::from("alice");
/// let response = engine
///     .file_manager()
///     .execute_command(theme, &principal, FileManagerCommand::Browse { path: String::new() })
///     .await;
///
/// if let FileManagerResponse::FolderListing { files, .. } = response {
///     println!("{} files", files.len());
/// }
/// # }
/// ```
pub struct FileManager {
    files: ThemeFiles,
    browse_handler: BrowseCommandHandler,
    edit_handler: EditCommandHandler,
    upload_handler: UploadCommandHandler,
}

impl FileManager {
    pub fn new(files: ThemeFiles) -> Self {
        Self {
            browse_handler: BrowseCommandHandler::new(files.clone()),
            edit_handler: EditCommandHandler::new(files.clone()),
            upload_handler: UploadCommandHandler::new(files.clone()),
            files,
        }
    }

    /// Run `command` against one theme on behalf of `principal`.
    pub async fn execute_command(
        &self,
        theme_id: ThemeId,
        principal: &Principal,
        command: FileManagerCommand,
    ) -> FileManagerResponse {
        log::debug!("{principal} executing {} on theme {theme_id}", command_name(&command));

        let is_ajax = matches!(command, FileManagerCommand::UploadFilesAjax { .. });
        match self.handle_command(theme_id, principal, command).await {
            Ok(response) => response,
            Err(error) if is_ajax => {
                log::error!("Upload command failed: {error}");
                FileManagerResponse::json_error(500, error.user_message())
            }
            Err(error) => {
                if error.is_user_error() {
                    log::warn!("Command rejected: {error}");
                } else {
                    log::error!("Command execution failed: {error}");
                }
                FileManagerResponse::Error { error }
            }
        }
    }

    /// Route an editor request and execute the resulting command.
    pub async fn handle_request(
        &self,
        principal: &Principal,
        request: EditorRequest,
    ) -> FileManagerResponse {
        let theme_id = request.theme_id;
        let action = request.action;

        match request.into_command() {
            Ok(command) => self.execute_command(theme_id, principal, command).await,
            Err(ThemeError::MethodNotAllowed { method, .. }) if action == EditorAction::UploadAjax => {
                FileManagerResponse::json_error(400, format!("{method} not allowed"))
            }
            Err(error) => {
                log::warn!("Rejected editor request: {error}");
                FileManagerResponse::Error { error }
            }
        }
    }

    async fn handle_command(
        &self,
        theme_id: ThemeId,
        principal: &Principal,
        command: FileManagerCommand,
    ) -> ThemeResult<FileManagerResponse> {
        let theme = self.files.theme(theme_id).await?;

        match command {
            // Browsing
            FileManagerCommand::Browse { path } => {
                self.browse_handler.handle_browse(&theme, path).await
            }
            FileManagerCommand::ReadFile { path } => {
                self.browse_handler.handle_read_file(&theme, path).await
            }
            FileManagerCommand::ListFolder { path } => {
                self.browse_handler.handle_list_folder(&theme, path).await
            }

            // Editing
            FileManagerCommand::EditForm { path } => {
                self.edit_handler.handle_edit_form(&theme, path).await
            }
            FileManagerCommand::SaveFile {
                path,
                new_path,
                content,
            } => {
                self.edit_handler
                    .handle_save_file(&theme, principal, path, new_path, content)
                    .await
            }
            FileManagerCommand::ConfirmDelete { path } => {
                self.edit_handler.handle_confirm_delete(&theme, path).await
            }
            FileManagerCommand::DeleteFile { path } => {
                self.edit_handler
                    .handle_delete_file(&theme, principal, path)
                    .await
            }
            FileManagerCommand::NewFileForm { folder } => {
                self.edit_handler.handle_new_file_form(&theme, folder).await
            }
            FileManagerCommand::CreateFile { path, content } => {
                self.edit_handler
                    .handle_create_file(&theme, principal, path, content)
                    .await
            }
            FileManagerCommand::CreateFolder { path } => {
                self.edit_handler
                    .handle_create_folder(&theme, principal, path)
                    .await
            }

            // Uploading
            FileManagerCommand::UploadForm { folder } => {
                self.upload_handler.handle_upload_form(&theme, folder).await
            }
            FileManagerCommand::UploadFiles { folder, files } => {
                self.upload_handler
                    .handle_upload(&theme, principal, folder, files)
                    .await
            }
            FileManagerCommand::UploadFilesAjax { folder, files } => {
                self.upload_handler
                    .handle_upload_ajax(&theme, principal, folder, files)
                    .await
            }
        }
    }
}

fn command_name(command: &FileManagerCommand) -> &'static str {
    match command {
        FileManagerCommand::Browse { .. } => "browse",
        FileManagerCommand::ReadFile { .. } => "read",
        FileManagerCommand::ListFolder { .. } => "list",
        FileManagerCommand::EditForm { .. } => "edit form",
        FileManagerCommand::SaveFile { .. } => "save",
        FileManagerCommand::ConfirmDelete { .. } => "confirm delete",
        FileManagerCommand::DeleteFile { .. } => "delete",
        FileManagerCommand::NewFileForm { .. } => "new file form",
        FileManagerCommand::CreateFile { .. } => "create",
        FileManagerCommand::UploadForm { .. } => "upload form",
        FileManagerCommand::UploadFiles { .. } => "upload",
        FileManagerCommand::UploadFilesAjax { .. } => "upload (ajax)",
        FileManagerCommand::CreateFolder { .. } => "create folder",
    }
}
