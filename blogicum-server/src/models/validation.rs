//! Validation error types

use std::fmt;

/// Validation error for form input and domain models
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// String doesn't match required format (e.g., slug, username)
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Referenced row (category, location) does not exist
    UnknownReference { field: &'static str, id: i64 },

    /// Value is already taken by another row
    Taken { field: &'static str, value: String },

    /// Two fields that must agree don't
    Mismatch { field: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::UnknownReference { field, id } => {
                write!(f, "{} {} does not exist", field, id)
            }
            Self::Taken { field, value } => {
                write!(f, "{} '{}' is already taken", field, value)
            }
            Self::Mismatch { field } => write!(f, "{} fields do not match", field),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Reject empty (after trim) or over-long input, returning the trimmed value.
pub(crate) fn bounded(
    s: &str,
    field: &'static str,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = s.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }

    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }

    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "title",
            max: 256,
        };
        assert_eq!(
            err.to_string(),
            "title exceeds maximum length of 256 characters"
        );

        let err = ValidationError::UnknownReference {
            field: "category",
            id: 7,
        };
        assert_eq!(err.to_string(), "category 7 does not exist");
    }

    #[test]
    fn bounded_counts_chars_not_bytes() {
        // Cyrillic letters are two bytes each in UTF-8
        let title = "ж".repeat(256);
        assert!(bounded(&title, "title", 256).is_ok());

        let err = bounded(&"ж".repeat(257), "title", 256).unwrap_err();
        assert_eq!(err, ValidationError::TooLong { field: "title", max: 256 });
    }

    #[test]
    fn bounded_trims() {
        assert_eq!(bounded("  hi  ", "text", 10).unwrap(), "hi");
        assert_eq!(
            bounded("   ", "text", 10).unwrap_err(),
            ValidationError::Empty { field: "text" }
        );
    }
}
