use server::common::ThemeError;
use std::path::PathBuf;

/// Failures surfaced by the command-line front end.
///
/// Engine failures are carried through unchanged so their user messages
/// and status codes stay available to the caller.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown theme '{0}'")]
    UnknownTheme(String),

    #[error(transparent)]
    Theme(#[from] ThemeError),

    #[error("{0}")]
    Usage(String),

    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to initialise logging: {0}")]
    Logger(#[from] log::SetLoggerError),
}

impl AppError {
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(message) => format!(
                "{message}\n\nCheck themekit.toml and any THEMEKIT__* environment variables."
            ),
            AppError::Io { path, source } => {
                format!("Could not read {}: {source}", path.display())
            }
            AppError::UnknownTheme(theme) => format!(
                "No theme named '{theme}' is configured. Run `themekit themes --all` to list them."
            ),
            AppError::Theme(error) => error.user_message(),
            AppError::Usage(message) => message.clone(),
            AppError::Encode(error) => format!("Could not format the output: {error}"),
            AppError::Logger(error) => format!("Logging is unavailable: {error}"),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_errors_keep_their_message() {
        let error = AppError::from(ThemeError::not_found("dark/templates/x.html"));
        assert_eq!(
            error.user_message(),
            ThemeError::not_found("dark/templates/x.html").user_message()
        );
    }

    #[test]
    fn test_unknown_theme_points_at_listing() {
        let message = AppError::UnknownTheme("neon".to_string()).user_message();
        assert!(message.contains("neon"));
        assert!(message.contains("themes --all"));
    }
}
