//! Location repository

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::DbError;
use crate::models::validation::bounded;

const MAX_NAME_LEN: usize = 256;

/// Location record from database
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// Location repository
pub struct LocationRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> LocationRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Location>, DbError> {
        let locations = sqlx::query_as::<_, Location>(
            "SELECT id, name, is_published, created_at FROM locations ORDER BY name, id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(locations)
    }

    pub async fn create(&self, name: &str, is_published: bool) -> Result<Location, DbError> {
        let name = bounded(name, "name", MAX_NAME_LEN)?;

        let location = sqlx::query_as::<_, Location>(
            r#"
            INSERT INTO locations (name, is_published)
            VALUES ($1, $2)
            RETURNING id, name, is_published, created_at
            "#,
        )
        .bind(name)
        .bind(is_published)
        .fetch_one(self.pool)
        .await?;

        Ok(location)
    }
}
