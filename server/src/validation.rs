//! Input validation for theme roots and submitted file paths.

use crate::common::ThemeError;

/// Core validation trait that all validators must implement.
///
/// # Type Parameters
///
/// * `T` - The type of data being validated (can be unsized like `str`)
///
/// # Examples
///
/// ```
/// use server::validation::{FilePathValidator, Validator};
///
/// assert!(FilePathValidator.validate("templates/base.html").is_ok());
/// assert!(FilePathValidator.validate("templates/").is_err());
/// ```
pub trait Validator<T: ?Sized> {
    type Error;

    /// Validate the input and return Ok(()) if valid, or Err with validation error
    fn validate(&self, input: &T) -> Result<(), Self::Error>;
}

/// The literal sequence for a parent-directory reference.
pub(crate) const PARENT_DIR: &str = "..";

/// Validator for a theme's root key inside the backing store.
///
/// Roots are relative keys: non-empty, no parent-directory references, no
/// drive prefixes and no NUL bytes.
pub struct ThemeRootValidator;

impl Validator<str> for ThemeRootValidator {
    type Error = ThemeError;

    fn validate(&self, input: &str) -> Result<(), Self::Error> {
        let trimmed = input.trim_matches(|c| c == '/' || c == '\\');

        if trimmed.trim().is_empty() {
            return Err(ThemeError::invalid_path(
                input,
                "Theme path cannot be empty",
            ));
        }

        if input.contains(PARENT_DIR) {
            return Err(ThemeError::invalid_path(
                input,
                "Theme path cannot contain relative segments",
            ));
        }

        check_common(input)
    }
}

/// Validator for the `path` field of the file editor form.
///
/// Mirrors what the editor accepts: no relative segments anywhere and a file
/// name must follow the last directory separator.
pub struct FilePathValidator;

impl Validator<str> for FilePathValidator {
    type Error = ThemeError;

    fn validate(&self, input: &str) -> Result<(), Self::Error> {
        if input.trim().is_empty() {
            return Err(ThemeError::invalid_path(input, "A file path is required."));
        }

        if input.contains(PARENT_DIR) {
            return Err(ThemeError::invalid_path(input, "No relative paths allowed."));
        }

        if input.ends_with('/') || input.ends_with('\\') {
            return Err(ThemeError::invalid_path(
                input,
                "A filename must be included after a directory separator.",
            ));
        }

        check_common(input)
    }
}

/// Validator for a single uploaded file name.
pub struct FileNameValidator;

impl Validator<str> for FileNameValidator {
    type Error = ThemeError;

    fn validate(&self, input: &str) -> Result<(), Self::Error> {
        if input.trim().is_empty() || input == "." {
            return Err(ThemeError::invalid_path(input, "File name cannot be empty"));
        }

        if input.contains(PARENT_DIR) {
            return Err(ThemeError::invalid_path(input, "No relative paths allowed."));
        }

        if input.contains('/') || input.contains('\\') {
            return Err(ThemeError::invalid_path(
                input,
                "File name cannot contain directory separators",
            ));
        }

        check_common(input)
    }
}

fn check_common(input: &str) -> Result<(), ThemeError> {
    if input.contains('\0') {
        return Err(ThemeError::invalid_path(input, "Path contains a NUL byte"));
    }

    // `C:` style prefixes would turn into absolute paths on some backends.
    let first = input
        .trim_start_matches(|c| c == '/' || c == '\\')
        .split(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    if first.len() >= 2 && first.ends_with(':') {
        return Err(ThemeError::invalid_path(
            input,
            "Drive or scheme prefixes are not allowed",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_root_validator() {
        let validator = ThemeRootValidator;

        assert!(validator.validate("themes/dark").is_ok());
        assert!(validator.validate("/dark/").is_ok());

        assert!(validator.validate("").is_err());
        assert!(validator.validate("///").is_err());
        assert!(validator.validate("../dark").is_err());
        assert!(validator.validate("dark/..").is_err());
        assert!(validator.validate("C:/themes").is_err());
    }

    #[test]
    fn test_file_path_validator() {
        let validator = FilePathValidator;

        assert!(validator.validate("templates/base.html").is_ok());
        assert!(validator.validate("robots.txt").is_ok());

        assert!(validator.validate("").is_err());
        assert!(validator.validate("templates/").is_err());
        assert!(validator.validate("templates\\").is_err());
        assert!(validator.validate("../secret").is_err());
        assert!(validator.validate("a/../../b").is_err());
        assert!(validator.validate("bad\0name").is_err());
    }

    #[test]
    fn test_file_name_validator() {
        let validator = FileNameValidator;

        assert!(validator.validate("logo.png").is_ok());
        assert!(validator.validate("").is_err());
        assert!(validator.validate("..").is_err());
        assert!(validator.validate("dir/logo.png").is_err());
        assert!(validator.validate("dir\\logo.png").is_err());
    }
}
