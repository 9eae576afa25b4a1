//! Comment text validation

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Raw comment form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

/// Validated comment text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentText(String);

impl CommentText {
    /// Non-empty after trimming; stored as submitted.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.trim().is_empty() {
            return Err(ValidationError::Empty { field: "text" });
        }
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank() {
        assert!(CommentText::new("").is_err());
        assert!(CommentText::new("\t \n").is_err());
    }

    #[test]
    fn keeps_text_as_submitted() {
        let text = CommentText::new("  nice post\n").unwrap();
        assert_eq!(text.as_str(), "  nice post\n");
    }
}
