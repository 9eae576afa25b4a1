//! Post repository
//!
//! Listing goes through [`PostQuery`]: one scope (everything, a category, an
//! author) plus an optional "published only" filter. Every listing joins
//! author, category and location and carries the comment count, newest
//! `pub_date` first.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use super::DbError;
use crate::models::{PageRequest, Paginated, Pagination, PostDraft, ValidationError, Visibility};

/// Category fields carried with a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRef {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub is_published: bool,
}

/// Location fields carried with a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationRef {
    pub id: i64,
    pub name: String,
    pub is_published: bool,
}

/// Post with its author, category and location resolved
#[derive(Debug, Clone)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub author_id: i64,
    pub author_username: String,
    pub category: Option<CategoryRef>,
    pub location: Option<LocationRef>,
}

impl Post {
    pub fn visibility(&self) -> Visibility {
        Visibility {
            is_published: self.is_published,
            category_published: self.category.as_ref().map(|c| c.is_published),
            pub_date: self.pub_date,
        }
    }
}

/// Post with comment count for list display
#[derive(Debug, Clone)]
pub struct PostWithCount {
    pub post: Post,
    pub comment_count: i64,
}

/// Which posts a listing covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    All,
    Category(i64),
    Author(i64),
}

/// Listing query: scope plus the optional publication filter
#[derive(Debug, Clone, Copy)]
pub struct PostQuery {
    pub scope: PostScope,
    pub published_only: bool,
    pub now: DateTime<Utc>,
}

impl PostQuery {
    /// Published posts within `scope`, as seen at `now`.
    pub fn published(scope: PostScope, now: DateTime<Utc>) -> Self {
        Self {
            scope,
            published_only: true,
            now,
        }
    }

    /// Every post within `scope`, drafts and scheduled ones included.
    pub fn unfiltered(scope: PostScope, now: DateTime<Utc>) -> Self {
        Self {
            scope,
            published_only: false,
            now,
        }
    }

    fn push_filters(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE TRUE");
        match self.scope {
            PostScope::All => {}
            PostScope::Category(id) => {
                qb.push(" AND p.category_id = ").push_bind(id);
            }
            PostScope::Author(id) => {
                qb.push(" AND p.author_id = ").push_bind(id);
            }
        }
        if self.published_only {
            qb.push(" AND p.is_published AND c.is_published AND p.pub_date <= ")
                .push_bind(self.now);
        }
    }
}

const POST_COLUMNS: &str = r#"
    p.id, p.title, p.text, p.pub_date, p.is_published, p.created_at,
    p.author_id, u.username AS author_username,
    c.id AS category_id, c.title AS category_title, c.slug AS category_slug,
    c.is_published AS category_is_published,
    l.id AS location_id, l.name AS location_name, l.is_published AS location_is_published
"#;

const POST_JOINS: &str = r#"
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN locations l ON l.id = p.location_id
"#;

fn post_from_row(row: &PgRow) -> Result<Post, sqlx::Error> {
    let category = match row.try_get::<Option<i64>, _>("category_id")? {
        Some(id) => Some(CategoryRef {
            id,
            title: row.try_get("category_title")?,
            slug: row.try_get("category_slug")?,
            is_published: row.try_get("category_is_published")?,
        }),
        None => None,
    };

    let location = match row.try_get::<Option<i64>, _>("location_id")? {
        Some(id) => Some(LocationRef {
            id,
            name: row.try_get("location_name")?,
            is_published: row.try_get("location_is_published")?,
        }),
        None => None,
    };

    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        text: row.try_get("text")?,
        pub_date: row.try_get("pub_date")?,
        is_published: row.try_get("is_published")?,
        created_at: row.try_get("created_at")?,
        author_id: row.try_get("author_id")?,
        author_username: row.try_get("author_username")?,
        category,
        location,
    })
}

/// Post repository
pub struct PostRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> PostRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Count posts matching a query.
    pub async fn count(&self, query: &PostQuery) -> Result<i64, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM posts p LEFT JOIN categories c ON c.id = p.category_id",
        );
        query.push_filters(&mut qb);

        let total = qb.build_query_scalar::<i64>().fetch_one(self.pool).await?;
        Ok(total)
    }

    /// Fetch one window of a listing with comment counts.
    ///
    /// Uses LEFT JOIN + GROUP BY to get counts in a single query (no N+1).
    pub async fn list(
        &self,
        query: &PostQuery,
        window: Pagination,
    ) -> Result<Vec<PostWithCount>, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(POST_COLUMNS)
            .push(", COUNT(cm.id) AS comment_count")
            .push(POST_JOINS)
            .push(" LEFT JOIN comments cm ON cm.post_id = p.id");
        query.push_filters(&mut qb);
        qb.push(" GROUP BY p.id, u.id, c.id, l.id")
            .push(" ORDER BY p.pub_date DESC, p.id DESC")
            .push(" LIMIT ")
            .push_bind(window.limit())
            .push(" OFFSET ")
            .push_bind(window.offset());

        let rows = qb.build().fetch_all(self.pool).await?;
        rows.iter()
            .map(|row| {
                Ok(PostWithCount {
                    post: post_from_row(row)?,
                    comment_count: row.try_get("comment_count")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(DbError::from)
    }

    /// Resolve the requested page and fetch it.
    ///
    /// Returns `None` when the page lies past the end of the listing.
    pub async fn page(
        &self,
        query: &PostQuery,
        request: PageRequest,
        per_page: u32,
    ) -> Result<Option<Paginated<PostWithCount>>, DbError> {
        let total = self.count(query).await?;
        let Some(window) = Pagination::resolve(request, per_page, total) else {
            return Ok(None);
        };

        let items = if total == 0 {
            Vec::new()
        } else {
            self.list(query, window).await?
        };
        Ok(Some(Paginated::new(items, total, window)))
    }

    /// Get a single post by ID, regardless of visibility.
    pub async fn get(&self, id: i64) -> Result<Post, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(POST_COLUMNS)
            .push(POST_JOINS)
            .push(" WHERE p.id = ")
            .push_bind(id);

        let row = qb
            .build()
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("post", id))?;

        Ok(post_from_row(&row)?)
    }

    /// Create a post for `author_id`, returning its id.
    pub async fn create(&self, author_id: i64, draft: &PostDraft) -> Result<i64, DbError> {
        let mut tx = self.pool.begin().await?;
        check_references(&mut tx, draft).await?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO posts (title, text, pub_date, author_id, location_id, category_id, is_published)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.text)
        .bind(draft.pub_date)
        .bind(author_id)
        .bind(draft.location_id)
        .bind(draft.category_id)
        .bind(draft.is_published)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id)
    }

    /// Overwrite the editable fields of a post. The author never changes.
    pub async fn update(&self, id: i64, draft: &PostDraft) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;
        check_references(&mut tx, draft).await?;

        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = $2, text = $3, pub_date = $4, location_id = $5,
                category_id = $6, is_published = $7
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.text)
        .bind(draft.pub_date)
        .bind(draft.location_id)
        .bind(draft.category_id)
        .bind(draft.is_published)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("post", id));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete a post and its comments (atomic).
    pub async fn delete_with_comments(&self, id: i64) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        let comments = sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("post", id));
        }

        tx.commit().await?;
        tracing::debug!(
            post_id = id,
            comments = comments.rows_affected(),
            "Deleted post with comments"
        );
        Ok(())
    }
}

/// Verify the category and location a draft points at exist.
async fn check_references(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    draft: &PostDraft,
) -> Result<(), DbError> {
    let (category_exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
            .bind(draft.category_id)
            .fetch_one(&mut **tx)
            .await?;

    if !category_exists {
        return Err(ValidationError::UnknownReference {
            field: "category",
            id: draft.category_id,
        }
        .into());
    }

    if let Some(location_id) = draft.location_id {
        let (location_exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM locations WHERE id = $1)")
                .bind(location_id)
                .fetch_one(&mut **tx)
                .await?;

        if !location_exists {
            return Err(ValidationError::UnknownReference {
                field: "location",
                id: location_id,
            }
            .into());
        }
    }

    Ok(())
}
