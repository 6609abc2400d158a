use crate::error::AppError;
use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub mod app;
pub mod validation;

pub use app::{AppConfig, ThemeSeed};
pub use validation::ConfigValidationError;

/// File looked up in the working directory, then in the user config dir.
pub const DEFAULT_CONFIG_FILE: &str = "themekit.toml";

/// Prefix for environment overrides, e.g. `THEMEKIT__STORAGE__BACKEND=memory`.
pub const ENV_PREFIX: &str = "THEMEKIT";

/// Outcome of reading and checking the configuration.
#[derive(Debug)]
pub enum ConfigLoadResult {
    Success(Box<AppConfig>),
    LoadError(String),
    DeserializeError(String),
}

impl ConfigLoadResult {
    pub fn into_result(self) -> Result<AppConfig, AppError> {
        match self {
            ConfigLoadResult::Success(config) => Ok(*config),
            ConfigLoadResult::LoadError(message) | ConfigLoadResult::DeserializeError(message) => {
                Err(AppError::Config(message))
            }
        }
    }
}

/// Pick the configuration file to read.
///
/// An explicit path always wins, even when it does not exist, so a typo in
/// `--config` fails loudly instead of silently running with defaults.
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("themekit").join(DEFAULT_CONFIG_FILE))
        .filter(|path| path.exists())
}

/// Load configuration from the TOML file (if any) and `THEMEKIT__*`
/// environment variables, which override file values.
pub fn load_config(explicit: Option<&Path>) -> ConfigLoadResult {
    dotenv::dotenv().ok();

    let mut builder = Config::builder();
    if let Some(path) = config_path(explicit) {
        builder = builder
            .add_source(File::new(&path.to_string_lossy(), FileFormat::Toml).required(true));
    }
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    );

    finish(builder)
}

/// Load configuration from TOML text only.
pub fn parse_config(source: &str) -> ConfigLoadResult {
    finish(Config::builder().add_source(File::from_str(source, FileFormat::Toml)))
}

fn finish(builder: ConfigBuilder<DefaultState>) -> ConfigLoadResult {
    let config = match builder.build() {
        Ok(config) => config,
        Err(e) => {
            return ConfigLoadResult::LoadError(format!(
                "Configuration loading failed: {e}. Please check your themekit.toml file and environment variables."
            ));
        }
    };

    let app_config = match config.try_deserialize::<AppConfig>() {
        Ok(app_config) => app_config,
        Err(e) => {
            return ConfigLoadResult::DeserializeError(format!(
                "Failed to deserialize config: {e}"
            ));
        }
    };

    if let Err(errors) = app_config.validate() {
        let messages: Vec<String> = errors.iter().map(|e| e.user_message()).collect();
        return ConfigLoadResult::DeserializeError(format!(
            "Configuration validation failed:\n{}",
            messages.join("\n\n")
        ));
    }

    ConfigLoadResult::Success(Box::new(app_config))
}

/// Logging configuration
#[derive(Debug, Deserialize, Default, Clone)]
pub struct LoggingConfig {
    level: Option<String>,
    file: Option<String>,
}

impl LoggingConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or("info")
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn set_level(&mut self, level: impl Into<String>) {
        self.level = Some(level.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::*;
    use std::io::Write;

    #[test]
    fn test_empty_source_uses_defaults() {
        let config = assert_ok!(parse_config("").into_result());
        assert_eq!(config.logging().level(), "info");
        assert_none!(config.logging().file());
        assert!(config.themes().is_empty());
        assert_eq!(config.engine().templates_dir(), "templates");
    }

    #[test]
    fn test_invalid_toml_is_a_load_error() {
        let result = parse_config("[logging\nlevel = ");
        assert!(matches!(result, ConfigLoadResult::LoadError(_)));
    }

    #[test]
    fn test_wrong_type_is_a_deserialize_error() {
        let result = parse_config("[engine]\npreview_ttl_secs = \"soon\"\n");
        assert!(matches!(result, ConfigLoadResult::DeserializeError(_)));
    }

    #[test]
    fn test_validation_failures_are_reported_together() {
        let source = r#"
            [logging]
            level = "chatty"

            [[themes]]
            name = "dark"

            [[themes]]
            name = "dark"
        "#;
        let ConfigLoadResult::DeserializeError(message) = parse_config(source) else {
            panic!("expected validation to fail");
        };
        assert!(message.contains("chatty"));
        assert!(message.contains("dark"));
    }

    #[test]
    fn test_explicit_path_wins_even_if_missing() {
        let missing = Path::new("/nonexistent/themekit.toml");
        assert_eq!(config_path(Some(missing)), Some(missing.to_path_buf()));
        assert!(matches!(
            load_config(Some(missing)),
            ConfigLoadResult::LoadError(_)
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[storage]\nbackend = \"memory\"\n\n[[themes]]\nname = \"base\"\norder = 3"
        )
        .unwrap();

        let config = assert_ok!(load_config(Some(file.path())).into_result());
        assert_eq!(config.themes().len(), 1);
        assert_eq!(config.themes()[0].order(), 3);
    }
}
