//! Category repository

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::{is_unique_violation, DbError};
use crate::models::validation::bounded;
use crate::models::{CategorySlug, ValidationError};

const MAX_TITLE_LEN: usize = 256;

/// Category record from database
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// Validated input for a new category
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub title: String,
    pub description: String,
    pub slug: CategorySlug,
    pub is_published: bool,
}

impl NewCategory {
    pub fn new(
        title: &str,
        description: &str,
        slug: &str,
        is_published: bool,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            title: bounded(title, "title", MAX_TITLE_LEN)?,
            description: description.trim().to_owned(),
            slug: CategorySlug::new(slug)?,
            is_published,
        })
    }
}

/// Category repository
pub struct CategoryRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a published category by slug; hidden categories are not found.
    pub async fn published_by_slug(&self, slug: &str) -> Result<Category, DbError> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, title, description, slug, is_published, created_at
            FROM categories
            WHERE slug = $1 AND is_published
            "#,
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("category", slug))
    }

    /// List every category, published or not, by title.
    pub async fn list(&self) -> Result<Vec<Category>, DbError> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, title, description, slug, is_published, created_at
            FROM categories
            ORDER BY title, id
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(categories)
    }

    pub async fn create(&self, category: NewCategory) -> Result<Category, DbError> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (title, description, slug, is_published)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, slug, is_published, created_at
            "#,
        )
        .bind(&category.title)
        .bind(&category.description)
        .bind(category.slug.as_str())
        .bind(category.is_published)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::Invalid(ValidationError::Taken {
                    field: "slug",
                    value: category.slug.as_str().to_owned(),
                })
            } else {
                DbError::Sqlx(e)
            }
        })
    }

    /// Publish or hide a category. Hiding it hides all of its posts.
    pub async fn set_published(&self, slug: &str, is_published: bool) -> Result<Category, DbError> {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories SET is_published = $2
            WHERE slug = $1
            RETURNING id, title, description, slug, is_published, created_at
            "#,
        )
        .bind(slug)
        .bind(is_published)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("category", slug))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_category_validates() {
        let c = NewCategory::new(" Travel ", " trips ", "travel", true).unwrap();
        assert_eq!(c.title, "Travel");
        assert_eq!(c.description, "trips");

        assert!(NewCategory::new("", "", "travel", true).is_err());
        assert!(NewCategory::new("Travel", "", "no spaces allowed", true).is_err());
    }
}
