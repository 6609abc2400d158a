//! Safe browsing and editing of theme files.
//!
//! Every path goes through [`VirtualPath`](crate::storage::VirtualPath)
//! before the storage adapter is touched. Writes that land under a theme's
//! templates folder clear the resolution cache.

pub mod command_handlers;
pub mod commands;
pub mod content;
pub mod manager;
pub mod responses;
pub mod routing;
pub mod types;

pub use command_handlers::{EntryKind, ThemeFiles};
pub use commands::FileManagerCommand;
pub use manager::FileManager;
pub use responses::{EditFormData, FileManagerResponse};
pub use routing::{EditorAction, EditorForm, EditorRequest, RequestMethod};
pub use types::{
    Breadcrumb, ContentKind, FileDetails, FileEntry, FolderEntry, ImageFormat, ThemeSummary,
    UploadedFile,
};
