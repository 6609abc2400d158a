use crate::preview::DEFAULT_PREVIEW_TTL;
use serde::Deserialize;
use std::time::Duration;

/// Tunables for the resolution engine.
///
/// All values are optional in configuration files; accessors fall back to
/// the defaults listed on each field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Templates folder inside each theme (default: "templates")
    templates_dir: Option<String>,
    /// Static files folder inside each theme (default: "static")
    static_dir: Option<String>,
    /// Lifetime of preview overrides in seconds (default: 500)
    preview_ttl_secs: Option<u64>,
    /// Lifetime of cached resolutions in seconds (default: until invalidated)
    resolution_cache_ttl_secs: Option<u64>,
}

impl EngineConfig {
    pub fn templates_dir(&self) -> &str {
        folder_or(&self.templates_dir, "templates")
    }

    pub fn static_dir(&self) -> &str {
        folder_or(&self.static_dir, "static")
    }

    pub fn preview_ttl(&self) -> Duration {
        self.preview_ttl_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_PREVIEW_TTL)
    }

    pub fn resolution_cache_ttl(&self) -> Option<Duration> {
        self.resolution_cache_ttl_secs.map(Duration::from_secs)
    }

    pub fn with_preview_ttl(mut self, ttl_secs: u64) -> Self {
        self.preview_ttl_secs = Some(ttl_secs);
        self
    }

    pub fn with_resolution_cache_ttl(mut self, ttl_secs: u64) -> Self {
        self.resolution_cache_ttl_secs = Some(ttl_secs);
        self
    }

    pub fn with_templates_dir(mut self, dir: impl Into<String>) -> Self {
        self.templates_dir = Some(dir.into());
        self
    }
}

fn folder_or<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    value
        .as_deref()
        .map(|dir| dir.trim_matches('/'))
        .filter(|dir| !dir.is_empty())
        .unwrap_or(default)
}
