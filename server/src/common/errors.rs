use thiserror::Error;

/// Errors produced by theme resolution, storage access and file management.
///
/// The variants follow the taxonomy the file manager surfaces to callers:
///
/// ## User-input errors
/// - [`InvalidPath`] - traversal attempts or malformed paths, always raised
///   before any storage call is made
/// - [`AlreadyExists`] - a create operation collided with an existing path
/// - [`MethodNotAllowed`] - an editor action was requested with the wrong method
///
/// ## Lookup errors
/// - [`NotFound`] - the storage backend has nothing at the given key
/// - [`NotADirectory`] - a listing was requested for a key that is a file
/// - [`ThemeNotFound`] - the registry does not know the requested theme
/// - [`TemplateNotFound`] - every candidate theme was tried without a hit
///
/// ## Backend errors
/// - [`Unsupported`] - the operation is meaningless for the active backend
/// - [`Storage`] - the backing store failed with an I/O error
///
/// # Examples
///
/// ```no_run
/// use server::common::ThemeError;
///
/// let error = ThemeError::invalid_path("../etc/passwd", "parent directory segments are not allowed");
/// assert_eq!(error.http_status(), 400);
/// ```
///
/// [`InvalidPath`]: ThemeError::InvalidPath
/// [`AlreadyExists`]: ThemeError::AlreadyExists
/// [`MethodNotAllowed`]: ThemeError::MethodNotAllowed
/// [`NotFound`]: ThemeError::NotFound
/// [`NotADirectory`]: ThemeError::NotADirectory
/// [`ThemeNotFound`]: ThemeError::ThemeNotFound
/// [`TemplateNotFound`]: ThemeError::TemplateNotFound
/// [`Unsupported`]: ThemeError::Unsupported
/// [`Storage`]: ThemeError::Storage
#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("'{key}' does not exist")]
    NotFound { key: String },

    #[error("'{key}' already exists")]
    AlreadyExists { key: String },

    #[error("'{key}' is not a directory")]
    NotADirectory { key: String },

    #[error("Theme not found: {id}")]
    ThemeNotFound { id: String },

    #[error("Template '{name}' not found in any active or previewed theme")]
    TemplateNotFound { name: String },

    #[error("Operation '{operation}' is not supported by the {backend} storage backend")]
    Unsupported {
        operation: String,
        backend: String,
    },

    #[error("{method} not allowed for action '{action}'")]
    MethodNotAllowed { action: String, method: String },

    #[error("Storage error on '{key}': {source}")]
    Storage {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

impl ThemeError {
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn unsupported(operation: impl Into<String>, backend: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
            backend: backend.into(),
        }
    }

    /// Wrap an I/O error, mapping `NotFound` onto the dedicated variant.
    pub fn from_io(key: impl Into<String>, source: std::io::Error) -> Self {
        let key = key.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { key },
            std::io::ErrorKind::AlreadyExists => Self::AlreadyExists { key },
            _ => Self::Storage { key, source },
        }
    }

    /// Status code used when the error crosses the HTTP-shaped boundary.
    pub fn http_status(&self) -> u16 {
        match self {
            ThemeError::InvalidPath { .. } => 400,
            ThemeError::NotFound { .. }
            | ThemeError::ThemeNotFound { .. }
            | ThemeError::TemplateNotFound { .. } => 404,
            ThemeError::MethodNotAllowed { .. } => 405,
            ThemeError::AlreadyExists { .. } | ThemeError::NotADirectory { .. } => 409,
            ThemeError::Unsupported { .. } => 501,
            ThemeError::Storage { .. } => 500,
        }
    }

    /// Whether the error came from user input rather than the backend.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ThemeError::InvalidPath { .. }
                | ThemeError::AlreadyExists { .. }
                | ThemeError::MethodNotAllowed { .. }
        )
    }

    /// Message suitable for showing next to a form or in a flash banner.
    pub fn user_message(&self) -> String {
        match self {
            ThemeError::InvalidPath { reason, .. } => reason.clone(),
            ThemeError::NotFound { key } => format!("'{key}' does not exist."),
            ThemeError::AlreadyExists { key } => {
                format!("'{key}' already exists. Choose another name or edit the existing file.")
            }
            ThemeError::Unsupported { operation, backend } => {
                format!("Cannot {operation}: the {backend} storage backend does not support it.")
            }
            other => other.to_string(),
        }
    }
}

/// Result type for theme operations
pub type ThemeResult<T> = Result<T, ThemeError>;
