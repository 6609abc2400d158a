use crate::registry::ThemeId;
use serde::Serialize;
use std::sync::Arc;

/// Where a resolved file came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateOrigin {
    pub theme_id: ThemeId,
    pub theme_name: String,
    pub storage_key: String,
}

/// A template (or static file) located in the winning theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
    pub name: String,
    pub origin: TemplateOrigin,
    pub contents: Arc<Vec<u8>>,
}

impl ResolvedTemplate {
    /// Contents as UTF-8 text, if they are valid UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.contents).ok()
    }
}

/// One theme/key pair the resolver will try, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub theme_id: ThemeId,
    pub theme_name: String,
    pub order: i32,
    pub storage_key: String,
}

impl std::fmt::Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})::{}", self.theme_name, self.order, self.storage_key)
    }
}
