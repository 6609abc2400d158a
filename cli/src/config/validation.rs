/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid logging level: '{configured}'")]
    LogLevel { configured: String },

    #[error("Invalid preview_ttl_secs: {configured} (min: {min_limit}, max: {max_limit})")]
    PreviewTtl {
        configured: u64,
        min_limit: u64,
        max_limit: u64,
    },

    #[error("Theme #{index} has no name")]
    ThemeName { index: usize },

    #[error("Theme '{name}' is configured more than once")]
    DuplicateTheme { name: String },

    #[error("Invalid path for theme '{name}': {reason}")]
    ThemePath { name: String, reason: String },

    #[error("Theme '{name}' reuses the root '{path}'")]
    DuplicateThemePath { name: String, path: String },
}

impl ConfigValidationError {
    pub fn user_message(&self) -> String {
        match self {
            ConfigValidationError::LogLevel { configured } => format!(
                "Unknown logging level '{configured}'.\n\
                Use one of: off, error, warn, info, debug, trace."
            ),
            ConfigValidationError::PreviewTtl {
                configured,
                min_limit,
                max_limit,
            } => format!(
                "Preview lifetime out of range!\n\n\
                Your configured value: {configured} seconds\n\
                Valid range: {min_limit} - {max_limit}\n\n\
                Please update preview_ttl_secs under [engine]."
            ),
            ConfigValidationError::ThemeName { index } => format!(
                "Theme entry #{} has an empty name.\n\
                Every [[themes]] entry needs a name.",
                index + 1
            ),
            ConfigValidationError::DuplicateTheme { name } => format!(
                "Theme '{name}' is listed twice.\n\
                Theme names must be unique."
            ),
            ConfigValidationError::ThemePath { name, reason } => format!(
                "Theme '{name}' has an invalid path: {reason}"
            ),
            ConfigValidationError::DuplicateThemePath { name, path } => format!(
                "Theme '{name}' uses the root '{path}', which another theme already uses.\n\
                Give each theme its own folder."
            ),
        }
    }
}
