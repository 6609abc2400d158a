//! Traversal-safe paths inside a theme root.
//!
//! Resolution is a pure string computation: nothing here touches a storage
//! backend. Both `/` and `\` are accepted as separators in requested paths and
//! storage keys always use `/`.

use crate::common::{ThemeError, ThemeResult};
use crate::validation::{PARENT_DIR, ThemeRootValidator, Validator};
use std::fmt;

/// A validated path inside a theme root.
///
/// Holds the requested path in normalized relative form together with the
/// absolute storage key it maps to. The key is always the root itself or a
/// descendant of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VirtualPath {
    root: String,
    relative: String,
    key: String,
}

impl VirtualPath {
    /// Resolve `requested` against `theme_root`.
    ///
    /// Leading and trailing separators are stripped, repeated separators and
    /// `.` segments collapse. Fails with [`ThemeError::InvalidPath`] when the
    /// input contains a parent-directory reference anywhere, a blank segment,
    /// a drive prefix, or when the result would not be a descendant of the
    /// root.
    pub fn resolve(theme_root: &str, requested: &str) -> ThemeResult<Self> {
        let root = normalize_root(theme_root)?;
        let segments = normalize_segments(requested)?;
        let relative = segments.join("/");

        let key = if relative.is_empty() {
            root.clone()
        } else {
            format!("{root}/{relative}")
        };

        if key.contains(PARENT_DIR) {
            return Err(ThemeError::invalid_path(
                requested,
                "Parent directory references are not allowed",
            ));
        }
        if key != root && !key.starts_with(&format!("{root}/")) {
            return Err(ThemeError::invalid_path(
                requested,
                "Path escapes the theme root",
            ));
        }

        Ok(Self {
            root,
            relative,
            key,
        })
    }

    /// Resolve a path that must name a file.
    ///
    /// On top of [`VirtualPath::resolve`] this rejects empty paths and paths
    /// ending in a directory separator.
    pub fn resolve_file(theme_root: &str, requested: &str) -> ThemeResult<Self> {
        if requested.ends_with('/') || requested.ends_with('\\') {
            return Err(ThemeError::invalid_path(
                requested,
                "A filename must be included after a directory separator.",
            ));
        }

        let path = Self::resolve(theme_root, requested)?;
        if path.is_root() {
            return Err(ThemeError::invalid_path(requested, "A file path is required."));
        }
        Ok(path)
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Normalized path relative to the theme root (empty at the root).
    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// Absolute storage key.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_root(&self) -> bool {
        self.relative.is_empty()
    }

    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.relative.rsplit('/').next()
    }

    pub fn extension(&self) -> Option<&str> {
        self.file_name()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }

    /// The containing folder, or `None` at the theme root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let parent_relative = self
            .relative
            .rsplit_once('/')
            .map(|(parent, _)| parent)
            .unwrap_or_default();
        let key = if parent_relative.is_empty() {
            self.root.clone()
        } else {
            format!("{}/{}", self.root, parent_relative)
        };
        Some(Self {
            root: self.root.clone(),
            relative: parent_relative.to_string(),
            key,
        })
    }

    /// Resolve `child` below this path.
    pub fn join(&self, child: &str) -> ThemeResult<Self> {
        if self.is_root() {
            Self::resolve(&self.root, child)
        } else {
            Self::resolve(&self.root, &format!("{}/{}", self.relative, child))
        }
    }

    /// Path of this entry relative to the top-level `dir` folder, if inside it.
    pub fn strip_dir(&self, dir: &str) -> Option<&str> {
        self.relative
            .strip_prefix(dir.trim_matches('/'))
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|rest| !rest.is_empty())
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Resolve `requested` against `theme_root` and return the storage key.
pub fn resolve(theme_root: &str, requested: &str) -> ThemeResult<String> {
    VirtualPath::resolve(theme_root, requested).map(|path| path.key)
}

/// Canonical storage key for a theme root, e.g. `a//./b/` becomes `a/b`.
pub fn normalize_root(theme_root: &str) -> ThemeResult<String> {
    ThemeRootValidator.validate(theme_root)?;
    let segments = normalize_segments(theme_root)?;
    Ok(segments.join("/"))
}

fn normalize_segments(requested: &str) -> ThemeResult<Vec<String>> {
    if requested.contains(PARENT_DIR) {
        return Err(ThemeError::invalid_path(
            requested,
            "No relative paths allowed.",
        ));
    }
    if requested.contains('\0') {
        return Err(ThemeError::invalid_path(requested, "Path contains a NUL byte"));
    }

    let unified = requested.replace('\\', "/");
    let mut segments = Vec::new();

    for segment in unified.trim_matches('/').split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if segment.trim().is_empty() {
            return Err(ThemeError::invalid_path(
                requested,
                "Path segments cannot be blank",
            ));
        }
        if segments.is_empty() && segment.len() >= 2 && segment.ends_with(':') {
            return Err(ThemeError::invalid_path(
                requested,
                "Drive or scheme prefixes are not allowed",
            ));
        }
        segments.push(segment.to_string());
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invalid(root: &str, requested: &str) {
        assert!(
            matches!(
                VirtualPath::resolve(root, requested),
                Err(ThemeError::InvalidPath { .. })
            ),
            "expected '{requested}' to be rejected"
        );
    }

    #[test]
    fn test_resolve_simple() {
        let path = VirtualPath::resolve("dark", "templates/base.html").unwrap();
        assert_eq!(path.key(), "dark/templates/base.html");
        assert_eq!(path.relative(), "templates/base.html");
        assert_eq!(path.file_name(), Some("base.html"));
        assert_eq!(path.extension(), Some("html"));
    }

    #[test]
    fn test_resolve_normalizes_separators() {
        let path = VirtualPath::resolve("/themes\\dark/", "\\templates\\\\partials/./nav.html/").unwrap();
        assert_eq!(path.key(), "themes/dark/templates/partials/nav.html");
    }

    #[test]
    fn test_resolve_root() {
        let path = VirtualPath::resolve("dark", "/").unwrap();
        assert!(path.is_root());
        assert_eq!(path.key(), "dark");
        assert_eq!(path.parent(), None);
        assert_eq!(path.file_name(), None);
    }

    #[test]
    fn test_rejects_parent_references() {
        assert_invalid("dark", "..");
        assert_invalid("dark", "../light/templates/x.html");
        assert_invalid("dark", "templates/../../x");
        assert_invalid("dark", "templates\\..\\..\\x");
        assert_invalid("dark", "templates/..");
        assert_invalid("../dark", "x.html");
    }

    #[test]
    fn test_rejects_blank_segments_and_prefixes() {
        assert_invalid("dark", "templates/   /x.html");
        assert_invalid("dark", "C:/windows/system.ini");
        assert_invalid("dark", "bad\0name");
        assert_invalid("", "x.html");
    }

    #[test]
    fn test_resolve_file_rejects_trailing_separator() {
        assert!(VirtualPath::resolve_file("dark", "templates/").is_err());
        assert!(VirtualPath::resolve_file("dark", "templates\\").is_err());
        assert!(VirtualPath::resolve_file("dark", "").is_err());
        assert!(VirtualPath::resolve_file("dark", "templates/x.html").is_ok());
    }

    #[test]
    fn test_parent_and_join() {
        let path = VirtualPath::resolve("dark", "templates/partials/nav.html").unwrap();
        let parent = path.parent().unwrap();
        assert_eq!(parent.relative(), "templates/partials");
        assert_eq!(parent.key(), "dark/templates/partials");

        let top = VirtualPath::resolve("dark", "robots.txt").unwrap().parent().unwrap();
        assert!(top.is_root());

        let joined = parent.join("footer.html").unwrap();
        assert_eq!(joined.key(), "dark/templates/partials/footer.html");
        assert!(parent.join("../../x").is_err());
    }

    #[test]
    fn test_strip_dir() {
        let path = VirtualPath::resolve("dark", "templates/partials/nav.html").unwrap();
        assert_eq!(path.strip_dir("templates"), Some("partials/nav.html"));
        assert_eq!(path.strip_dir("static"), None);

        let not_inside = VirtualPath::resolve("dark", "templatesx/nav.html").unwrap();
        assert_eq!(not_inside.strip_dir("templates"), None);
    }

    #[test]
    fn test_free_resolve() {
        assert_eq!(resolve("a", "templates/x.html").unwrap(), "a/templates/x.html");
    }
}
