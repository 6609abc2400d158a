//! Theme records and the ordered listing the resolver consumes.

pub mod types;

pub use types::{NewTheme, Theme, ThemeId};

use crate::common::{ThemeError, ThemeResult};
use crate::storage::virtual_path::normalize_root;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Read side of the theme registry.
#[async_trait]
pub trait ThemeRegistry: Send + Sync + Debug {
    /// Themes that are active or listed in `include`, ordered by `order`
    /// descending. Equal orders keep registration order.
    async fn list_themes(&self, include: &HashSet<ThemeId>) -> ThemeResult<Vec<Theme>>;

    /// # Errors
    ///
    /// Returns [`ThemeError::ThemeNotFound`] for unknown ids.
    async fn get_theme(&self, id: ThemeId) -> ThemeResult<Theme>;
}

/// Registry kept in memory, in registration order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryThemeRegistry {
    themes: Arc<RwLock<Vec<Theme>>>,
}

impl InMemoryThemeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new theme.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::InvalidPath`] for unsafe roots and
    /// [`ThemeError::AlreadyExists`] when another theme already uses the path.
    pub async fn insert(&self, new: NewTheme) -> ThemeResult<Theme> {
        let path = normalize_root(&new.path)?;

        let mut themes = self.themes.write().await;
        if themes.iter().any(|theme| theme.path == path) {
            return Err(ThemeError::AlreadyExists { key: path });
        }

        let now = Utc::now();
        let theme = Theme {
            id: ThemeId::new(),
            name: new.name,
            author: new.author,
            version: new.version,
            order: new.order,
            is_active: new.is_active,
            path,
            description: new.description,
            created_at: now,
            updated_at: now,
        };

        log::info!("Registered theme '{}' ({}) at '{}'", theme.name, theme.id, theme.path);
        themes.push(theme.clone());
        Ok(theme)
    }

    /// Replace the editable fields of a theme, keeping its identity,
    /// creation time and registration position.
    pub async fn update(&self, id: ThemeId, changes: NewTheme) -> ThemeResult<Theme> {
        let path = normalize_root(&changes.path)?;

        let mut themes = self.themes.write().await;
        if themes
            .iter()
            .any(|theme| theme.id != id && theme.path == path)
        {
            return Err(ThemeError::AlreadyExists { key: path });
        }

        let theme = themes
            .iter_mut()
            .find(|theme| theme.id == id)
            .ok_or_else(|| ThemeError::ThemeNotFound { id: id.to_string() })?;

        theme.name = changes.name;
        theme.author = changes.author;
        theme.version = changes.version;
        theme.order = changes.order;
        theme.is_active = changes.is_active;
        theme.path = path;
        theme.description = changes.description;
        theme.updated_at = Utc::now();

        log::info!("Updated theme '{}' ({})", theme.name, theme.id);
        Ok(theme.clone())
    }

    pub async fn set_active(&self, id: ThemeId, is_active: bool) -> ThemeResult<Theme> {
        let mut themes = self.themes.write().await;
        let theme = themes
            .iter_mut()
            .find(|theme| theme.id == id)
            .ok_or_else(|| ThemeError::ThemeNotFound { id: id.to_string() })?;
        theme.is_active = is_active;
        theme.updated_at = Utc::now();
        Ok(theme.clone())
    }

    pub async fn remove(&self, id: ThemeId) -> ThemeResult<Theme> {
        let mut themes = self.themes.write().await;
        let index = themes
            .iter()
            .position(|theme| theme.id == id)
            .ok_or_else(|| ThemeError::ThemeNotFound { id: id.to_string() })?;
        let removed = themes.remove(index);
        log::info!("Removed theme '{}' ({})", removed.name, removed.id);
        Ok(removed)
    }

    /// Every theme in registration order, active or not.
    pub async fn all(&self) -> Vec<Theme> {
        self.themes.read().await.clone()
    }

    pub async fn find_by_name(&self, name: &str) -> Option<Theme> {
        let themes = self.themes.read().await;
        themes.iter().find(|theme| theme.name == name).cloned()
    }
}

#[async_trait]
impl ThemeRegistry for InMemoryThemeRegistry {
    async fn list_themes(&self, include: &HashSet<ThemeId>) -> ThemeResult<Vec<Theme>> {
        let themes = self.themes.read().await;
        let mut selected: Vec<Theme> = themes
            .iter()
            .filter(|theme| theme.is_active || include.contains(&theme.id))
            .cloned()
            .collect();
        // Stable sort keeps registration order among equal `order` values.
        selected.sort_by(|a, b| b.order.cmp(&a.order));
        Ok(selected)
    }

    async fn get_theme(&self, id: ThemeId) -> ThemeResult<Theme> {
        let themes = self.themes.read().await;
        themes
            .iter()
            .find(|theme| theme.id == id)
            .cloned()
            .ok_or_else(|| ThemeError::ThemeNotFound { id: id.to_string() })
    }
}
