use super::types::ResolvedTemplate;
use crate::common::TtlCache;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Cache of resolved template lookups for principals without previews.
///
/// Keyed by template name only. Every [`invalidate_all`] bumps a generation
/// counter so a lookup that started before the invalidation cannot store its
/// now stale result afterwards (see [`put_if_generation`]).
///
/// [`invalidate_all`]: ResolutionCache::invalidate_all
/// [`put_if_generation`]: ResolutionCache::put_if_generation
#[derive(Debug, Clone)]
pub struct ResolutionCache {
    entries: TtlCache<String, ResolvedTemplate>,
    ttl: Option<Duration>,
    generation: Arc<AtomicU64>,
}

impl ResolutionCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: TtlCache::new(),
            ttl,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub async fn get(&self, name: &str) -> Option<ResolvedTemplate> {
        self.entries.get(&name.to_string()).await
    }

    pub async fn put(&self, name: &str, template: ResolvedTemplate) {
        self.entries.insert(name.to_string(), template, self.ttl).await;
    }

    /// Store `template` only if no invalidation happened since `generation`
    /// was read. Returns whether the entry was stored.
    pub async fn put_if_generation(
        &self,
        name: &str,
        template: ResolvedTemplate,
        generation: u64,
    ) -> bool {
        let stored = self
            .entries
            .update(name.to_string(), self.ttl, |current| {
                if self.generation() == generation {
                    Some(template)
                } else {
                    current
                }
            })
            .await;
        stored.is_some() && self.generation() == generation
    }

    pub async fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.entries.clear().await;
        log::debug!("Template resolution cache cleared");
    }

    pub async fn len(&self) -> usize {
        self.entries.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.is_empty().await
    }
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ThemeId;
    use crate::resolution::types::TemplateOrigin;

    fn template(body: &str) -> ResolvedTemplate {
        ResolvedTemplate {
            name: "base.html".to_string(),
            origin: TemplateOrigin {
                theme_id: ThemeId::new(),
                theme_name: "dark".to_string(),
                storage_key: "dark/templates/base.html".to_string(),
            },
            contents: Arc::new(body.as_bytes().to_vec()),
        }
    }

    #[tokio::test]
    async fn test_put_get_invalidate() {
        let cache = ResolutionCache::default();
        cache.put("base.html", template("a")).await;
        assert_eq!(cache.get("base.html").await.unwrap().as_text(), Some("a"));

        cache.invalidate_all().await;
        assert!(cache.get("base.html").await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_stale_generation_is_not_stored() {
        let cache = ResolutionCache::default();
        let generation = cache.generation();
        cache.invalidate_all().await;

        assert!(!cache.put_if_generation("base.html", template("stale"), generation).await);
        assert!(cache.get("base.html").await.is_none());

        let generation = cache.generation();
        assert!(cache.put_if_generation("base.html", template("fresh"), generation).await);
        assert_eq!(cache.len().await, 1);
    }
}
