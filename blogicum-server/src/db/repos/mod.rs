//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Uses JOINs for list operations (no N+1)
//! - Relies on constraints for uniqueness (no check-then-insert)
//! - Uses transactions for multi-step operations

pub mod users;
pub mod categories;
pub mod locations;
pub mod posts;
pub mod comments;

pub use users::{User, UserRepo};
pub use categories::{Category, CategoryRepo, NewCategory};
pub use locations::{Location, LocationRepo};
pub use posts::{CategoryRef, LocationRef, Post, PostQuery, PostRepo, PostScope, PostWithCount};
pub use comments::{Comment, CommentRepo};

use crate::models::ValidationError;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    /// Input that only the database can reject (duplicates, dangling ids)
    #[error("invalid input: {0}")]
    Invalid(#[from] ValidationError),
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

/// True when the error is a unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = DbError::not_found("post", 42);
        assert_eq!(err.to_string(), "not found: post '42'");
    }

    #[test]
    fn row_not_found_is_not_unique_violation() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
