//! Custom Axum extractors: who is making the request

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use chrono::Utc;

use super::error::ApiError;
use super::routes::paths;
use super::server::AppState;
use crate::auth::{cookie_value, SESSION_COOKIE};
use crate::db::repos::{User, UserRepo};

/// The requesting user, or `None` for anonymous visitors.
///
/// A missing, forged or expired session cookie is anonymous, not an error.
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<User>);

impl Viewer {
    pub fn id(&self) -> Option<i64> {
        self.0.as_ref().map(|u| u.id)
    }

    /// True when the viewer is the given user.
    pub fn is(&self, user_id: i64) -> bool {
        self.id() == Some(user_id)
    }
}

impl FromRequestParts<Arc<AppState>> for Viewer {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = cookie_value(&parts.headers, SESSION_COOKIE) else {
            return Ok(Self(None));
        };
        let Some(user_id) = state.sessions.verify(token, Utc::now()) else {
            tracing::debug!("Ignoring invalid or expired session cookie");
            return Ok(Self(None));
        };

        let user = UserRepo::new(&state.pool).find(user_id).await?;
        Ok(Self(user))
    }
}

/// A logged-in user. Anonymous visitors are redirected to the login page,
/// which sends them back here afterwards.
#[derive(Debug, Clone)]
pub struct LoginRequired(pub User);

impl FromRequestParts<Arc<AppState>> for LoginRequired {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Viewer(user) = Viewer::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match user {
            Some(user) => Ok(Self(user)),
            None => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or("/");
                Err(Redirect::to(&paths::login(Some(next))).into_response())
            }
        }
    }
}
