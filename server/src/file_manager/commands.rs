use super::types::UploadedFile;

/// Operations the theme file editor can perform.
///
/// Every command is scoped to one theme and carries paths relative to that
/// theme's root. Paths are validated by the handlers before any storage call.
///
/// # Command Categories
///
/// - **Browsing** - view a path (folder or file), read a file, list a folder
/// - **Editing** - edit form, save (with optional rename), delete, create
/// - **Uploading** - upload form, synchronous and JSON uploads
/// - **Folders** - create an empty folder on hierarchical backends
///
/// # Examples
///
/// ```no_run
/// use server::file_manager::FileManagerCommand;
///
/// let command = FileManagerCommand::SaveFile {
///     path: "templates/old.html".to_string(),
///     new_path: Some("templates/new.html".to_string()),
///     content: "<p>hi</p>".to_string(),
/// };
/// ```
#[derive(Debug, Clone)]
pub enum FileManagerCommand {
    /// Show a folder listing or a file, whichever the path turns out to be.
    Browse { path: String },

    ReadFile { path: String },

    ListFolder { path: String },

    /// Current contents of a file, pre-filled for editing.
    EditForm { path: String },

    /// Persist edited contents.
    ///
    /// With `new_path` set to a different path the contents are written there
    /// first and the old file is removed afterwards.
    SaveFile {
        path: String,
        new_path: Option<String>,
        content: String,
    },

    ConfirmDelete { path: String },

    /// Remove a file. Removing a missing file succeeds.
    DeleteFile { path: String },

    NewFileForm { folder: String },

    /// Create a new file; fails if anything already exists at `path`.
    CreateFile { path: String, content: String },

    UploadForm { folder: String },

    /// Store uploaded files under `folder`, overwriting existing ones.
    UploadFiles {
        folder: String,
        files: Vec<UploadedFile>,
    },

    /// Same as [`FileManagerCommand::UploadFiles`] with a JSON reply.
    UploadFilesAjax {
        folder: String,
        files: Vec<UploadedFile>,
    },

    CreateFolder { path: String },
}
