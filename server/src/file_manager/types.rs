use crate::registry::{Theme, ThemeId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One crumb of the path trail shown above every editor page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub name: String,
    /// Path relative to the theme root (empty for the root crumb).
    pub path: String,
}

/// A subfolder in a listing. The synthesized parent entry is named `..`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderEntry {
    pub name: String,
    pub path: String,
}

/// A file in a folder listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub size_display: String,
    pub modified: DateTime<Utc>,
}

/// Image formats recognised by their magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    WebP,
    Ico,
    Tiff,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Ico => "image/x-icon",
            ImageFormat::Tiff => "image/tiff",
        }
    }
}

/// Coarse classification of file contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContentKind {
    Text,
    Image(ImageFormat),
    Other,
}

impl ContentKind {
    /// The short name the editor templates switch on.
    pub fn filetype(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Image(_) => "image",
            ContentKind::Other => "other",
        }
    }
}

/// Everything the viewer, editor and delete confirmation need about a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDetails {
    pub name: String,
    pub path: String,
    pub extension: Option<String>,
    pub size: u64,
    pub size_display: String,
    pub modified: DateTime<Utc>,
    pub kind: ContentKind,
    /// Newline-terminated lines; zero for anything but text.
    pub lines: usize,
    /// Decoded contents for text files.
    pub text: Option<String>,
    /// `data:` URI for images.
    pub data_uri: Option<String>,
}

impl FileDetails {
    pub fn filetype(&self) -> &'static str {
        self.kind.filetype()
    }
}

/// A file received from an upload form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// The parts of a theme that editor responses carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeSummary {
    pub id: ThemeId,
    pub name: String,
    pub path: String,
}

impl From<&Theme> for ThemeSummary {
    fn from(theme: &Theme) -> Self {
        Self {
            id: theme.id,
            name: theme.name.clone(),
            path: theme.path.clone(),
        }
    }
}
