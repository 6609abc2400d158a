use super::cache::ResolutionCache;
use super::types::{Candidate, ResolvedTemplate, TemplateOrigin};
use crate::common::{ThemeError, ThemeResult};
use crate::preview::{Principal, PreviewStore};
use crate::registry::{Theme, ThemeId, ThemeRegistry};
use crate::storage::{StorageAdapter, VirtualPath};
use std::collections::HashSet;
use std::sync::Arc;

/// Finds the winning theme file for a template name.
///
/// Themes are consulted in registry order (highest `order` first). The first
/// theme that has the file wins. Principals with preview overrides always take
/// the uncached path so they see edits immediately.
#[derive(Debug, Clone)]
pub struct TemplateResolver {
    registry: Arc<dyn ThemeRegistry>,
    storage: Arc<dyn StorageAdapter>,
    previews: PreviewStore,
    cache: ResolutionCache,
    templates_dir: String,
    static_dir: String,
}

impl TemplateResolver {
    pub fn new(
        registry: Arc<dyn ThemeRegistry>,
        storage: Arc<dyn StorageAdapter>,
        previews: PreviewStore,
        cache: ResolutionCache,
        templates_dir: impl Into<String>,
        static_dir: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            storage,
            previews,
            cache,
            templates_dir: templates_dir.into(),
            static_dir: static_dir.into(),
        }
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    pub fn templates_dir(&self) -> &str {
        &self.templates_dir
    }

    pub fn static_dir(&self) -> &str {
        &self.static_dir
    }

    /// Resolve a template name for `principal`.
    ///
    /// # Errors
    ///
    /// - [`ThemeError::InvalidPath`] if `name` is unsafe, before any storage
    ///   access
    /// - [`ThemeError::TemplateNotFound`] if no candidate theme has the file
    /// - storage errors from the backend, unchanged
    pub async fn resolve(
        &self,
        name: &str,
        principal: Option<&Principal>,
    ) -> ThemeResult<ResolvedTemplate> {
        VirtualPath::resolve_file(&self.templates_dir, name)?;

        let overrides = self.overrides_for(principal).await;
        let use_cache = overrides.is_empty();

        let generation = self.cache.generation();
        if use_cache {
            if let Some(hit) = self.cache.get(name).await {
                log::debug!("Template cache hit for '{name}'");
                return Ok(hit);
            }
        } else {
            log::debug!(
                "Bypassing template cache for '{name}': {} preview override(s) active",
                overrides.len()
            );
        }

        let themes = self.registry.list_themes(&overrides).await?;
        let resolved = self
            .first_match(&themes, &self.templates_dir, name)
            .await?
            .ok_or_else(|| ThemeError::TemplateNotFound {
                name: name.to_string(),
            })?;

        if use_cache {
            self.cache
                .put_if_generation(name, resolved.clone(), generation)
                .await;
        }
        Ok(resolved)
    }

    /// Resolve a file from the themes' static folder. Never cached.
    pub async fn resolve_static(
        &self,
        name: &str,
        principal: Option<&Principal>,
    ) -> ThemeResult<ResolvedTemplate> {
        VirtualPath::resolve_file(&self.static_dir, name)?;

        let overrides = self.overrides_for(principal).await;
        let themes = self.registry.list_themes(&overrides).await?;
        self.first_match(&themes, &self.static_dir, name)
            .await?
            .ok_or_else(|| ThemeError::NotFound {
                key: format!("{}/{}", self.static_dir, name),
            })
    }

    /// The ordered list of theme/key pairs a template lookup would try.
    pub async fn candidates(
        &self,
        name: &str,
        principal: Option<&Principal>,
    ) -> ThemeResult<Vec<Candidate>> {
        let overrides = self.overrides_for(principal).await;
        let themes = self.registry.list_themes(&overrides).await?;

        themes
            .iter()
            .map(|theme| {
                let path = self.candidate_path(theme, &self.templates_dir, name)?;
                Ok(Candidate {
                    theme_id: theme.id,
                    theme_name: theme.name.clone(),
                    order: theme.order,
                    storage_key: path.key().to_string(),
                })
            })
            .collect()
    }

    /// Explicit cache reset.
    pub async fn reset_cache(&self) {
        log::info!("Resetting template resolution cache");
        self.cache.invalidate_all().await;
    }

    async fn overrides_for(&self, principal: Option<&Principal>) -> HashSet<ThemeId> {
        match principal {
            Some(principal) => self.previews.get_preview(principal).await,
            None => HashSet::new(),
        }
    }

    fn candidate_path(&self, theme: &Theme, dir: &str, name: &str) -> ThemeResult<VirtualPath> {
        VirtualPath::resolve_file(&format!("{}/{}", theme.path, dir), name)
    }

    async fn first_match(
        &self,
        themes: &[Theme],
        dir: &str,
        name: &str,
    ) -> ThemeResult<Option<ResolvedTemplate>> {
        for theme in themes {
            let path = self.candidate_path(theme, dir, name)?;
            log::debug!("Trying {} ({})::{}", theme.name, theme.order, path.key());

            if !self.storage.exists(path.key()).await? {
                continue;
            }

            let contents = match self.storage.open(path.key()).await {
                Ok(contents) => contents,
                // Removed between the existence check and the read.
                Err(ThemeError::NotFound { .. }) => continue,
                Err(e) => return Err(e),
            };

            return Ok(Some(ResolvedTemplate {
                name: name.to_string(),
                origin: TemplateOrigin {
                    theme_id: theme.id,
                    theme_name: theme.name.clone(),
                    storage_key: path.key().to_string(),
                },
                contents: Arc::new(contents),
            }));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{InMemoryThemeRegistry, NewTheme};
    use crate::storage::MemoryStorage;

    struct Fixture {
        registry: InMemoryThemeRegistry,
        storage: Arc<MemoryStorage>,
        previews: PreviewStore,
        resolver: TemplateResolver,
    }

    fn fixture() -> Fixture {
        let registry = InMemoryThemeRegistry::new();
        let storage = Arc::new(MemoryStorage::new());
        let previews = PreviewStore::default();
        let resolver = TemplateResolver::new(
            Arc::new(registry.clone()),
            storage.clone(),
            previews.clone(),
            ResolutionCache::default(),
            "templates",
            "static",
        );
        Fixture {
            registry,
            storage,
            previews,
            resolver,
        }
    }

    #[tokio::test]
    async fn test_higher_order_wins() {
        let f = fixture();
        f.registry
            .insert(NewTheme::new("low", "low").with_order(1).active(true))
            .await
            .unwrap();
        f.registry
            .insert(NewTheme::new("high", "high").with_order(2).active(true))
            .await
            .unwrap();
        f.storage.save("low/templates/x.html", b"low").await.unwrap();
        f.storage.save("high/templates/x.html", b"high").await.unwrap();

        let resolved = f.resolver.resolve("x.html", None).await.unwrap();
        assert_eq!(resolved.as_text(), Some("high"));
        assert_eq!(resolved.origin.theme_name, "high");
    }

    #[tokio::test]
    async fn test_invalid_name_fails_before_lookup() {
        let f = fixture();
        assert!(matches!(
            f.resolver.resolve("../secret.html", None).await,
            Err(ThemeError::InvalidPath { .. })
        ));
    }

    #[tokio::test]
    async fn test_not_found() {
        let f = fixture();
        f.registry
            .insert(NewTheme::new("a", "a").active(true))
            .await
            .unwrap();
        assert!(matches!(
            f.resolver.resolve("missing.html", None).await,
            Err(ThemeError::TemplateNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_cache_serves_stale_until_reset() {
        let f = fixture();
        f.registry
            .insert(NewTheme::new("a", "a").active(true))
            .await
            .unwrap();
        f.storage.save("a/templates/x.html", b"one").await.unwrap();

        assert_eq!(f.resolver.resolve("x.html", None).await.unwrap().as_text(), Some("one"));
        f.storage.save("a/templates/x.html", b"two").await.unwrap();
        assert_eq!(f.resolver.resolve("x.html", None).await.unwrap().as_text(), Some("one"));

        f.resolver.reset_cache().await;
        assert_eq!(f.resolver.resolve("x.html", None).await.unwrap().as_text(), Some("two"));
    }

    #[tokio::test]
    async fn test_previewing_principal_bypasses_cache() {
        let f = fixture();
        let theme = f
            .registry
            .insert(NewTheme::new("draft", "draft"))
            .await
            .unwrap();
        f.storage.save("draft/templates/x.html", b"one").await.unwrap();

        let alice = Principal::from("alice");
        f.previews.add_preview(&alice, theme.id).await;

        assert_eq!(
            f.resolver.resolve("x.html", Some(&alice)).await.unwrap().as_text(),
            Some("one")
        );
        f.storage.save("draft/templates/x.html", b"two").await.unwrap();
        assert_eq!(
            f.resolver.resolve("x.html", Some(&alice)).await.unwrap().as_text(),
            Some("two")
        );
        assert!(f.resolver.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_candidates_and_static() {
        let f = fixture();
        f.registry
            .insert(NewTheme::new("a", "a").with_order(3).active(true))
            .await
            .unwrap();
        f.registry
            .insert(NewTheme::new("b", "b").active(true))
            .await
            .unwrap();
        f.storage.save("b/static/css/site.css", b"body{}").await.unwrap();

        let candidates = f.resolver.candidates("x.html", None).await.unwrap();
        let keys: Vec<_> = candidates.iter().map(|c| c.storage_key.as_str()).collect();
        assert_eq!(keys, vec!["a/templates/x.html", "b/templates/x.html"]);
        assert_eq!(candidates[0].to_string(), "a (3)::a/templates/x.html");

        let css = f.resolver.resolve_static("css/site.css", None).await.unwrap();
        assert_eq!(css.origin.theme_name, "b");
        assert!(f.resolver.cache().is_empty().await);
    }
}
