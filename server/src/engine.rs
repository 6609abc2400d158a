//! The theme engine facade.
//!
//! Wires one storage adapter, one registry, the preview store, the resolution
//! cache, the resolver and the file manager together so they share state.

use crate::common::ThemeResult;
use crate::config::EngineConfig;
use crate::file_manager::{FileManager, ThemeFiles};
use crate::preview::{Principal, PreviewStore};
use crate::registry::{ThemeId, ThemeRegistry};
use crate::resolution::{Candidate, ResolutionCache, ResolvedTemplate, TemplateResolver};
use crate::storage::StorageAdapter;
use std::collections::HashSet;
use std::sync::Arc;

/// Everything needed to resolve and edit theme files.
pub struct ThemeEngine {
    storage: Arc<dyn StorageAdapter>,
    registry: Arc<dyn ThemeRegistry>,
    previews: PreviewStore,
    resolver: TemplateResolver,
    file_manager: FileManager,
}

impl ThemeEngine {
    pub fn new(
        config: &EngineConfig,
        storage: Arc<dyn StorageAdapter>,
        registry: Arc<dyn ThemeRegistry>,
    ) -> Self {
        let previews = PreviewStore::new(config.preview_ttl());
        let cache = ResolutionCache::new(config.resolution_cache_ttl());

        let resolver = TemplateResolver::new(
            registry.clone(),
            storage.clone(),
            previews.clone(),
            cache.clone(),
            config.templates_dir(),
            config.static_dir(),
        );
        let file_manager = FileManager::new(ThemeFiles::new(
            registry.clone(),
            storage.clone(),
            cache,
            config.templates_dir(),
        ));

        log::debug!(
            "Theme engine ready ({} storage, templates in '{}')",
            storage.capabilities().backend,
            config.templates_dir()
        );

        Self {
            storage,
            registry,
            previews,
            resolver,
            file_manager,
        }
    }

    pub fn storage(&self) -> &Arc<dyn StorageAdapter> {
        &self.storage
    }

    pub fn registry(&self) -> &Arc<dyn ThemeRegistry> {
        &self.registry
    }

    pub fn previews(&self) -> &PreviewStore {
        &self.previews
    }

    pub fn resolver(&self) -> &TemplateResolver {
        &self.resolver
    }

    pub fn file_manager(&self) -> &FileManager {
        &self.file_manager
    }

    pub async fn resolve_template(
        &self,
        name: &str,
        principal: Option<&Principal>,
    ) -> ThemeResult<ResolvedTemplate> {
        self.resolver.resolve(name, principal).await
    }

    pub async fn resolve_static(
        &self,
        name: &str,
        principal: Option<&Principal>,
    ) -> ThemeResult<ResolvedTemplate> {
        self.resolver.resolve_static(name, principal).await
    }

    pub async fn candidates(
        &self,
        name: &str,
        principal: Option<&Principal>,
    ) -> ThemeResult<Vec<Candidate>> {
        self.resolver.candidates(name, principal).await
    }

    /// Preview exactly these themes, after checking that each exists.
    pub async fn preview_themes(
        &self,
        principal: &Principal,
        themes: HashSet<ThemeId>,
    ) -> ThemeResult<()> {
        for id in &themes {
            self.registry.get_theme(*id).await?;
        }
        self.previews.set_preview(principal, themes).await;
        Ok(())
    }

    pub async fn reset_template_cache(&self) {
        self.resolver.reset_cache().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ThemeError;
    use crate::registry::{InMemoryThemeRegistry, NewTheme};
    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn test_preview_themes_rejects_unknown_ids() {
        let registry = InMemoryThemeRegistry::new();
        let engine = ThemeEngine::new(
            &EngineConfig::default(),
            Arc::new(MemoryStorage::new()),
            Arc::new(registry.clone()),
        );
        let theme = registry.insert(NewTheme::new("a", "a")).await.unwrap();
        let alice = Principal::from("alice");

        let result = engine
            .preview_themes(&alice, HashSet::from([theme.id, ThemeId::new()]))
            .await;
        assert!(matches!(result, Err(ThemeError::ThemeNotFound { .. })));
        assert!(engine.previews().get_preview(&alice).await.is_empty());

        engine
            .preview_themes(&alice, HashSet::from([theme.id]))
            .await
            .unwrap();
        assert!(engine.previews().is_previewing(&alice, theme.id).await);
    }
}
