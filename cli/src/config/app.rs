use super::{LoggingConfig, validation::ConfigValidationError};
use log::LevelFilter;
use serde::Deserialize;
use server::config::EngineConfig;
use server::registry::NewTheme;
use server::storage::StorageConfig;
use server::storage::virtual_path::normalize_root;
use std::collections::HashSet;

/// Longest preview lifetime accepted from configuration (one day).
pub const MAX_PREVIEW_TTL_SECS: u64 = 24 * 60 * 60;

/// Main application configuration
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    storage: StorageConfig,
    #[serde(default)]
    engine: EngineConfig,
    #[serde(default)]
    themes: Vec<ThemeSeed>,
}

impl AppConfig {
    /// Validate the configuration, collecting every problem at once.
    pub fn validate(&self) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        if self.logging.level().parse::<LevelFilter>().is_err() {
            errors.push(ConfigValidationError::LogLevel {
                configured: self.logging.level().to_string(),
            });
        }

        let preview_ttl = self.engine.preview_ttl().as_secs();
        if preview_ttl == 0 || preview_ttl > MAX_PREVIEW_TTL_SECS {
            errors.push(ConfigValidationError::PreviewTtl {
                configured: preview_ttl,
                min_limit: 1,
                max_limit: MAX_PREVIEW_TTL_SECS,
            });
        }

        let mut names = HashSet::new();
        let mut paths = HashSet::new();
        for (index, seed) in self.themes.iter().enumerate() {
            if seed.name.trim().is_empty() {
                errors.push(ConfigValidationError::ThemeName { index });
                continue;
            }
            if !names.insert(seed.name.as_str()) {
                errors.push(ConfigValidationError::DuplicateTheme {
                    name: seed.name.clone(),
                });
            }
            match normalize_root(seed.path()) {
                Ok(root) => {
                    if !paths.insert(root) {
                        errors.push(ConfigValidationError::DuplicateThemePath {
                            name: seed.name.clone(),
                            path: seed.path().to_string(),
                        });
                    }
                }
                Err(e) => errors.push(ConfigValidationError::ThemePath {
                    name: seed.name.clone(),
                    reason: e.user_message(),
                }),
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    pub fn logging_mut(&mut self) -> &mut LoggingConfig {
        &mut self.logging
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    pub fn themes(&self) -> &[ThemeSeed] {
        &self.themes
    }
}

/// A `[[themes]]` entry registered at start-up.
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeSeed {
    name: String,
    /// Root folder in storage (default: the theme name)
    path: Option<String>,
    /// Higher wins (default: 0)
    order: Option<i32>,
    /// Default: true
    active: Option<bool>,
    author: Option<String>,
    version: Option<String>,
    description: Option<String>,
}

impl ThemeSeed {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or(&self.name)
    }

    pub fn order(&self) -> i32 {
        self.order.unwrap_or(0)
    }

    pub fn active(&self) -> bool {
        self.active.unwrap_or(true)
    }

    pub fn to_new_theme(&self) -> NewTheme {
        let mut theme = NewTheme::new(self.name.clone(), self.path())
            .with_order(self.order())
            .active(self.active());
        if let Some(author) = &self.author {
            theme = theme.with_author(author.clone());
        }
        if let Some(version) = &self.version {
            theme = theme.with_version(version.clone());
        }
        if let Some(description) = &self.description {
            theme = theme.with_description(description.clone());
        }
        theme
    }
}
