//! User repository
//!
//! Usernames are unique; a duplicate surfaces as `ValidationError::Taken`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::{is_unique_violation, DbError};
use crate::models::{ProfileDraft, ValidationError};

/// User record (without the password hash)
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub date_joined: DateTime<Utc>,
}

const USER_COLUMNS: &str = "id, username, first_name, last_name, email, date_joined";

/// User repository
pub struct UserRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Register a new user with an already hashed password.
    pub async fn create(&self, profile: &ProfileDraft, password_hash: &str) -> Result<User, DbError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, first_name, last_name, email, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(profile.username.as_str())
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(profile.email.as_deref())
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| username_conflict(e, profile))
    }

    /// Look a user up by id. Missing users are `None`, not an error, since
    /// a session may outlive its user.
    pub async fn find(&self, id: i64) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by username.
    pub async fn by_username(&self, username: &str) -> Result<User, DbError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("user", username))
    }

    /// Fetch a user together with the stored password hash, for login.
    pub async fn credentials(&self, username: &str) -> Result<Option<(User, String)>, DbError> {
        let row = sqlx::query_as::<_, UserWithHash>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| (r.user, r.password_hash)))
    }

    /// Overwrite the editable profile fields.
    pub async fn update_profile(&self, id: i64, profile: &ProfileDraft) -> Result<User, DbError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = $2, first_name = $3, last_name = $4, email = $5
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(profile.username.as_str())
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(profile.email.as_deref())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| username_conflict(e, profile))?
        .ok_or_else(|| DbError::not_found("user", id))
    }
}

#[derive(FromRow)]
struct UserWithHash {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}

fn username_conflict(err: sqlx::Error, profile: &ProfileDraft) -> DbError {
    if is_unique_violation(&err) {
        DbError::Invalid(ValidationError::Taken {
            field: "username",
            value: profile.username.as_str().to_owned(),
        })
    } else {
        DbError::Sqlx(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProfileForm;

    fn draft(username: &str) -> ProfileDraft {
        ProfileDraft::new(&ProfileForm {
            username: username.into(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn other_errors_pass_through() {
        let err = username_conflict(sqlx::Error::RowNotFound, &draft("leo"));
        assert!(matches!(err, DbError::Sqlx(_)));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_username_is_taken() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url, 2).await.expect("pool");
        crate::db::migrate(&pool).await.expect("schema");

        let name = format!("dup-{}", Utc::now().timestamp_nanos_opt().unwrap_or_default());
        let repo = UserRepo::new(&pool);
        let profile = draft(&name);
        repo.create(&profile, "hash").await.expect("first insert");

        let err = repo.create(&profile, "hash").await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Invalid(ValidationError::Taken { field: "username", .. })
        ));
    }
}
