//! Per-principal theme preview overrides.
//!
//! A principal previewing a theme sees it during resolution even while the
//! theme is inactive. Overrides live only in memory and expire a fixed time
//! after the last write; losing them simply falls back to the active themes.

use crate::common::TtlCache;
use crate::registry::ThemeId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

/// Default lifetime of a preview override.
pub const DEFAULT_PREVIEW_TTL: Duration = Duration::from_secs(500);

/// Opaque identity of whoever is making a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Principal {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Shared store of preview overrides keyed by principal.
///
/// Every write refreshes the entry's TTL; reads never do. Updates to one
/// principal's set are serialized under the store's write lock.
#[derive(Debug, Clone)]
pub struct PreviewStore {
    overrides: TtlCache<Principal, HashSet<ThemeId>>,
    ttl: Duration,
}

impl PreviewStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            overrides: TtlCache::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Replace the principal's override set.
    pub async fn set_preview(&self, principal: &Principal, themes: HashSet<ThemeId>) {
        log::info!(
            "Principal '{principal}' now previewing {} theme(s)",
            themes.len()
        );
        self.overrides
            .update(principal.clone(), Some(self.ttl), |_| Some(themes))
            .await;
    }

    pub async fn add_preview(&self, principal: &Principal, theme: ThemeId) {
        log::info!("Principal '{principal}' started previewing theme {theme}");
        self.overrides
            .update(principal.clone(), Some(self.ttl), |current| {
                let mut themes = current.unwrap_or_default();
                themes.insert(theme);
                Some(themes)
            })
            .await;
    }

    /// Current override set; empty when absent or expired.
    pub async fn get_preview(&self, principal: &Principal) -> HashSet<ThemeId> {
        self.overrides.get(principal).await.unwrap_or_default()
    }

    /// Remove the given themes from the principal's set.
    ///
    /// Ids that are not being previewed are ignored. A set that becomes empty
    /// is dropped.
    pub async fn clear_preview(&self, principal: &Principal, themes: &HashSet<ThemeId>) {
        self.overrides
            .update(principal.clone(), Some(self.ttl), |current| {
                let mut remaining = current?;
                remaining.retain(|id| !themes.contains(id));
                if remaining.is_empty() {
                    None
                } else {
                    Some(remaining)
                }
            })
            .await;
        log::info!("Principal '{principal}' stopped previewing {} theme(s)", themes.len());
    }

    pub async fn stop_all(&self, principal: &Principal) {
        self.overrides.invalidate(principal).await;
        log::info!("Principal '{principal}' stopped all previews");
    }

    pub async fn is_previewing(&self, principal: &Principal, theme: ThemeId) -> bool {
        self.get_preview(principal).await.contains(&theme)
    }
}

impl Default for PreviewStore {
    fn default() -> Self {
        Self::new(DEFAULT_PREVIEW_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_set_add_get() {
        let store = PreviewStore::default();
        let alice = Principal::from("alice");
        let (a, b, c) = (ThemeId::new(), ThemeId::new(), ThemeId::new());

        store.set_preview(&alice, HashSet::from([a, b])).await;
        store.add_preview(&alice, c).await;
        assert_eq!(store.get_preview(&alice).await, HashSet::from([a, b, c]));

        store.set_preview(&alice, HashSet::from([c])).await;
        assert_eq!(store.get_preview(&alice).await, HashSet::from([c]));
    }

    #[tokio::test]
    async fn test_expired_principals_do_not_accumulate() {
        let store = PreviewStore::new(Duration::from_millis(10));
        for name in ["alice", "bob", "carol"] {
            store.add_preview(&Principal::from(name), ThemeId::new()).await;
        }
        sleep(Duration::from_millis(30)).await;

        store.add_preview(&Principal::from("dave"), ThemeId::new()).await;
        assert_eq!(store.overrides.stored_len().await, 1);
    }

    #[tokio::test]
    async fn test_clear_is_silent_for_missing_ids() {
        let store = PreviewStore::default();
        let alice = Principal::from("alice");
        let (a, b) = (ThemeId::new(), ThemeId::new());

        store.clear_preview(&alice, &HashSet::from([a])).await;
        assert!(store.get_preview(&alice).await.is_empty());

        store.add_preview(&alice, a).await;
        store.clear_preview(&alice, &HashSet::from([b])).await;
        assert!(store.is_previewing(&alice, a).await);

        store.clear_preview(&alice, &HashSet::from([a])).await;
        assert!(!store.is_previewing(&alice, a).await);
    }

    #[tokio::test]
    async fn test_principals_are_isolated() {
        let store = PreviewStore::default();
        let theme = ThemeId::new();
        store.add_preview(&Principal::from("alice"), theme).await;

        assert!(store.get_preview(&Principal::from("bob")).await.is_empty());

        store.stop_all(&Principal::from("alice")).await;
        assert!(store.get_preview(&Principal::from("alice")).await.is_empty());
    }

    #[tokio::test]
    async fn test_overrides_expire() {
        let store = PreviewStore::new(Duration::from_millis(30));
        let alice = Principal::from("alice");
        store.add_preview(&alice, ThemeId::new()).await;

        sleep(Duration::from_millis(60)).await;
        assert!(store.get_preview(&alice).await.is_empty());
    }
}
