//! Mapping of editor requests (`action` + method + form) onto commands.

use super::commands::FileManagerCommand;
use super::types::UploadedFile;
use crate::common::{ThemeError, ThemeResult};
use crate::registry::ThemeId;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// The `action` discriminator of an editor request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorAction {
    #[default]
    View,
    Edit,
    Delete,
    New,
    Upload,
    UploadAjax,
    CreateFolder,
}

impl EditorAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditorAction::View => "view",
            EditorAction::Edit => "edit",
            EditorAction::Delete => "delete",
            EditorAction::New => "new",
            EditorAction::Upload => "upload",
            EditorAction::UploadAjax => "upload_ajax",
            EditorAction::CreateFolder => "create_folder",
        }
    }

    /// Parse an optional query value; a missing action means view.
    pub fn from_query(action: Option<&str>) -> Self {
        action
            .map(|value| value.parse().unwrap_or_default())
            .unwrap_or_default()
    }
}

impl FromStr for EditorAction {
    type Err = Infallible;

    /// Unknown actions fall back to [`EditorAction::View`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let action = match s.trim().to_ascii_lowercase().as_str() {
            "" | "view" => EditorAction::View,
            "edit" => EditorAction::Edit,
            "delete" => EditorAction::Delete,
            "new" => EditorAction::New,
            "upload" => EditorAction::Upload,
            "upload_ajax" | "upload-ajax" => EditorAction::UploadAjax,
            "create_folder" | "create-folder" | "mkdir" => EditorAction::CreateFolder,
            other => {
                log::warn!("Unknown editor action '{other}', showing the plain view");
                EditorAction::View
            }
        };
        Ok(action)
    }
}

impl fmt::Display for EditorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestMethod::Get => f.write_str("GET"),
            RequestMethod::Post => f.write_str("POST"),
        }
    }
}

/// Submitted form fields.
#[derive(Debug, Clone, Default)]
pub struct EditorForm {
    /// The `path` field of the edit/new forms.
    pub path: Option<String>,
    /// The editor text area.
    pub content: Option<String>,
    pub files: Vec<UploadedFile>,
}

/// An editor request for one theme, as the web layer would receive it.
#[derive(Debug, Clone)]
pub struct EditorRequest {
    pub theme_id: ThemeId,
    pub path: String,
    pub action: EditorAction,
    pub method: RequestMethod,
    pub form: EditorForm,
}

impl EditorRequest {
    pub fn get(theme_id: ThemeId, path: impl Into<String>, action: EditorAction) -> Self {
        Self {
            theme_id,
            path: path.into(),
            action,
            method: RequestMethod::Get,
            form: EditorForm::default(),
        }
    }

    pub fn post(
        theme_id: ThemeId,
        path: impl Into<String>,
        action: EditorAction,
        form: EditorForm,
    ) -> Self {
        Self {
            theme_id,
            path: path.into(),
            action,
            method: RequestMethod::Post,
            form,
        }
    }

    /// Translate the request into a command.
    ///
    /// # Errors
    ///
    /// - [`ThemeError::MethodNotAllowed`] for `GET` on POST-only actions
    /// - [`ThemeError::InvalidPath`] when the new-file form omits its path
    pub fn into_command(self) -> ThemeResult<FileManagerCommand> {
        let EditorRequest {
            path,
            action,
            method,
            form,
            ..
        } = self;

        let command = match (action, method) {
            (EditorAction::View, _) => FileManagerCommand::Browse { path },

            (EditorAction::Edit, RequestMethod::Get) => FileManagerCommand::EditForm { path },
            (EditorAction::Edit, RequestMethod::Post) => {
                let new_path = form.path.filter(|new_path| new_path != &path);
                FileManagerCommand::SaveFile {
                    path,
                    new_path,
                    content: form.content.unwrap_or_default(),
                }
            }

            (EditorAction::Delete, RequestMethod::Get) => FileManagerCommand::ConfirmDelete { path },
            (EditorAction::Delete, RequestMethod::Post) => FileManagerCommand::DeleteFile { path },

            (EditorAction::New, RequestMethod::Get) => FileManagerCommand::NewFileForm { folder: path },
            (EditorAction::New, RequestMethod::Post) => {
                let path = form
                    .path
                    .ok_or_else(|| ThemeError::invalid_path("", "A file path is required."))?;
                FileManagerCommand::CreateFile {
                    path,
                    content: form.content.unwrap_or_default(),
                }
            }

            (EditorAction::Upload, RequestMethod::Get) => FileManagerCommand::UploadForm { folder: path },
            (EditorAction::Upload, RequestMethod::Post) => FileManagerCommand::UploadFiles {
                folder: path,
                files: form.files,
            },

            (EditorAction::UploadAjax, RequestMethod::Post) => FileManagerCommand::UploadFilesAjax {
                folder: path,
                files: form.files,
            },

            (EditorAction::CreateFolder, RequestMethod::Post) => FileManagerCommand::CreateFolder {
                path: form.path.unwrap_or(path),
            },

            (EditorAction::UploadAjax | EditorAction::CreateFolder, RequestMethod::Get) => {
                return Err(ThemeError::MethodNotAllowed {
                    action: action.to_string(),
                    method: method.to_string(),
                });
            }
        };

        Ok(command)
    }
}
