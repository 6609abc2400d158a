use super::types::{Breadcrumb, FileDetails, FileEntry, FolderEntry, ThemeSummary};
use crate::common::ThemeError;
use crate::registry::ThemeId;
use serde_json::Value;

/// Pre-filled values for the file editor form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditFormData {
    pub path: String,
    pub content: String,
}

/// Responses from file manager operations.
#[derive(Debug)]
pub enum FileManagerResponse {
    FolderListing {
        theme: ThemeSummary,
        path: String,
        breadcrumbs: Vec<Breadcrumb>,
        folders: Vec<FolderEntry>,
        files: Vec<FileEntry>,
    },

    FileView {
        theme: ThemeSummary,
        breadcrumbs: Vec<Breadcrumb>,
        file: FileDetails,
    },

    EditForm {
        theme: ThemeSummary,
        breadcrumbs: Vec<Breadcrumb>,
        form: EditFormData,
        file: FileDetails,
    },

    DeleteConfirmation {
        theme: ThemeSummary,
        breadcrumbs: Vec<Breadcrumb>,
        file: FileDetails,
    },

    NewFileForm {
        theme: ThemeSummary,
        breadcrumbs: Vec<Breadcrumb>,
        form: EditFormData,
    },

    UploadForm {
        theme: ThemeSummary,
        breadcrumbs: Vec<Breadcrumb>,
        folder: String,
    },

    /// A mutation succeeded; show `path` with a flash message.
    Redirect {
        theme_id: ThemeId,
        path: String,
        message: String,
    },

    /// Reply for the asynchronous upload endpoint.
    Json { status: u16, body: Value },

    Error { error: ThemeError },
}

impl FileManagerResponse {
    /// Status code of the HTTP reply this response maps onto.
    pub fn status(&self) -> u16 {
        match self {
            FileManagerResponse::Redirect { .. } => 302,
            FileManagerResponse::Json { status, .. } => *status,
            FileManagerResponse::Error { error } => error.http_status(),
            _ => 200,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status() >= 400
    }

    pub fn json_ok(message: impl Into<String>) -> Self {
        FileManagerResponse::Json {
            status: 200,
            body: serde_json::json!({ "ok": message.into() }),
        }
    }

    pub fn json_error(status: u16, message: impl Into<String>) -> Self {
        FileManagerResponse::Json {
            status,
            body: serde_json::json!({ "error": message.into() }),
        }
    }
}
