//! Comment repository
//!
//! Comments are always addressed through their post: a comment id paired
//! with the wrong post id is not found.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::DbError;
use crate::models::CommentText;

/// Comment with its author's username
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub post_id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
}

/// Comment repository
pub struct CommentRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CommentRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All comments of a post, oldest first, with authors joined in.
    pub async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, DbError> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT cm.id, cm.text, cm.post_id, cm.author_id,
                   u.username AS author_username, cm.created_at
            FROM comments cm
            JOIN users u ON u.id = cm.author_id
            WHERE cm.post_id = $1
            ORDER BY cm.created_at, cm.id
            "#,
        )
        .bind(post_id)
        .fetch_all(self.pool)
        .await?;

        Ok(comments)
    }

    /// Get one comment of a post.
    pub async fn get(&self, post_id: i64, comment_id: i64) -> Result<Comment, DbError> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT cm.id, cm.text, cm.post_id, cm.author_id,
                   u.username AS author_username, cm.created_at
            FROM comments cm
            JOIN users u ON u.id = cm.author_id
            WHERE cm.id = $1 AND cm.post_id = $2
            "#,
        )
        .bind(comment_id)
        .bind(post_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("comment", comment_id))
    }

    /// Add a comment; fails with not found if the post is gone.
    pub async fn create(
        &self,
        post_id: i64,
        author_id: i64,
        text: &CommentText,
    ) -> Result<i64, DbError> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            INSERT INTO comments (text, post_id, author_id)
            SELECT $1, p.id, $3 FROM posts p WHERE p.id = $2
            RETURNING id
            "#,
        )
        .bind(text.as_str())
        .bind(post_id)
        .bind(author_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(|(id,)| id)
            .ok_or_else(|| DbError::not_found("post", post_id))
    }

    pub async fn update(&self, comment_id: i64, text: &CommentText) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE comments SET text = $2 WHERE id = $1")
            .bind(comment_id)
            .bind(text.as_str())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("comment", comment_id));
        }
        Ok(())
    }

    pub async fn delete(&self, comment_id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("comment", comment_id));
        }
        Ok(())
    }
}
