//! Category slug validation
//!
//! Slug format: ASCII letters, digits, hyphens and underscores

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

/// Maximum length for category slugs
const MAX_SLUG_LEN: usize = 64;

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("invalid slug regex"));

/// Validated category slug
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategorySlug(String);

impl CategorySlug {
    /// Create a new slug, validating its format.
    ///
    /// # Example
    /// ```
    /// use blogicum_server::models::CategorySlug;
    ///
    /// assert!(CategorySlug::new("travel-2024").is_ok());
    /// assert!(CategorySlug::new("Travel_Notes").is_ok());
    /// assert!(CategorySlug::new("with space").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "slug" });
        }

        if s.len() > MAX_SLUG_LEN {
            return Err(ValidationError::TooLong {
                field: "slug",
                max: MAX_SLUG_LEN,
            });
        }

        if !SLUG_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "slug",
                reason: "must contain only latin letters, digits, hyphens and underscores",
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Get the slug as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CategorySlug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
