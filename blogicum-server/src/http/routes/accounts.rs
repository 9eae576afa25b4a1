//! Account endpoints: registration, login, logout

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::paths;
use crate::auth::{clear_session_cookie, hash_password, safe_next, session_cookie, verify_password};
use crate::db::repos::UserRepo;
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::{ProfileForm, RegistrationDraft, RegistrationForm};

/// GET /auth/registration/
#[derive(Serialize)]
pub struct RegistrationPage {
    pub form: ProfileForm,
}

/// GET /auth/login/
#[derive(Serialize)]
pub struct LoginPage {
    pub next: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct NextParam {
    pub next: Option<String>,
}

/// Submitted login form. `next` may come in the body or the query string.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

/// Run a PBKDF2 computation off the async runtime.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal {
            message: format!("password task failed: {}", e),
        })
}

async fn registration_form() -> Json<RegistrationPage> {
    Json(RegistrationPage {
        form: ProfileForm::default(),
    })
}

/// POST /auth/registration/ - creates the user, then sends them to log in
async fn register(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegistrationForm>,
) -> Result<Response, ApiError> {
    let RegistrationDraft { profile, password } = RegistrationDraft::new(&form)?;
    let password_hash = blocking(move || hash_password(&password)).await?;

    let user = UserRepo::new(&state.pool)
        .create(&profile, &password_hash)
        .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");
    Ok(Redirect::to(&paths::login(None)).into_response())
}

async fn login_form(Query(params): Query<NextParam>) -> Json<LoginPage> {
    Json(LoginPage {
        next: safe_next(params.next.as_deref()).to_string(),
    })
}

/// POST /auth/login/ - sets the session cookie on success
async fn login(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NextParam>,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let Some((user, stored_hash)) = UserRepo::new(&state.pool)
        .credentials(form.username.trim())
        .await?
    else {
        tracing::debug!("Login for unknown user");
        return Err(ApiError::BadCredentials);
    };

    let password = form.password;
    if !blocking(move || verify_password(&password, &stored_hash)).await? {
        tracing::debug!(user_id = user.id, "Login with wrong password");
        return Err(ApiError::BadCredentials);
    }

    let ttl = state.config.session_ttl();
    let expires = Utc::now() + chrono::Duration::seconds(ttl.as_secs() as i64);
    let token = state.sessions.issue(user.id, expires);
    let cookie = session_cookie(&token, ttl.as_secs(), state.config.secure_cookies);

    let next = safe_next(form.next.as_deref().or(params.next.as_deref()));
    tracing::info!(user_id = user.id, "User logged in");

    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to(next)).into_response())
}

/// POST /auth/logout/
async fn logout() -> Response {
    (
        AppendHeaders([(SET_COOKIE, clear_session_cookie())]),
        Redirect::to(&paths::index()),
    )
        .into_response()
}

/// Account routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/registration/", get(registration_form).post(register))
        .route("/auth/login/", get(login_form).post(login))
        .route("/auth/logout/", post(logout))
}

#[cfg(test)]
mod tests {
    use crate::http::server::tests::{location, offline_app, send};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};

    #[tokio::test]
    async fn login_page_keeps_local_next() {
        let response = send(
            offline_app(),
            Request::builder()
                .uri("/auth/login/?next=%2Fposts%2Fcreate%2F")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["next"], "/posts/create/");
    }

    #[tokio::test]
    async fn login_page_drops_foreign_next() {
        let response = send(
            offline_app(),
            Request::builder()
                .uri("/auth/login/?next=https%3A%2F%2Fevil.example%2F")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["next"], "/");
    }

    #[tokio::test]
    async fn login_page_drops_next_with_tab() {
        let response = send(
            offline_app(),
            Request::builder()
                .uri("/auth/login/?next=%2F%09%2Fevil.example%2F")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["next"], "/");
    }

    #[tokio::test]
    async fn logout_clears_cookie() {
        let response = send(
            offline_app(),
            Request::builder()
                .method("POST")
                .uri("/auth/logout/")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(cookie.starts_with("blogicum_session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn invalid_registration_is_rejected_before_storage() {
        let response = send(
            offline_app(),
            Request::builder()
                .method("POST")
                .uri("/auth/registration/")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(
                    "username=anna&password1=longenough1&password2=different22",
                ))
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
