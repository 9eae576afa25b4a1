//! Profile endpoints: public profile page and the owner's edit form

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Json, Router,
};
use chrono::Utc;
use serde::Serialize;

use super::paths;
use super::posts::{listing_page, PostSummary};
use crate::db::repos::{PostQuery, PostScope, User, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{LoginRequired, Viewer};
use crate::http::server::AppState;
use crate::models::{PageParams, Paginated, ProfileDraft, ProfileForm};

/// GET /profile/{username}/
#[derive(Serialize)]
pub struct ProfilePage {
    pub profile: User,
    pub is_owner: bool,
    pub page: Paginated<PostSummary>,
}

/// GET /profile/edit/
#[derive(Serialize)]
pub struct ProfileFormPage {
    pub form: ProfileForm,
}

/// A user's posts. The owner also sees drafts, scheduled posts and posts
/// in hidden categories; everyone else sees only published ones.
async fn profile(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path(username): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<ProfilePage>, ApiError> {
    let profile = UserRepo::new(&state.pool).by_username(&username).await?;
    let is_owner = viewer.is(profile.id);

    let scope = PostScope::Author(profile.id);
    let query = if is_owner {
        PostQuery::unfiltered(scope, Utc::now())
    } else {
        PostQuery::published(scope, Utc::now())
    };
    let page = listing_page(&state, query, &params).await?;

    Ok(Json(ProfilePage {
        profile,
        is_owner,
        page,
    }))
}

fn form_from_user(user: &User) -> ProfileForm {
    ProfileForm {
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        email: user.email.clone().unwrap_or_default(),
    }
}

/// GET /profile/edit/
async fn edit_profile_form(LoginRequired(user): LoginRequired) -> Json<ProfileFormPage> {
    Json(ProfileFormPage {
        form: form_from_user(&user),
    })
}

/// POST /profile/edit/
async fn edit_profile(
    State(state): State<Arc<AppState>>,
    LoginRequired(user): LoginRequired,
    Form(form): Form<ProfileForm>,
) -> Result<Response, ApiError> {
    let draft = ProfileDraft::new(&form)?;
    let updated = UserRepo::new(&state.pool)
        .update_profile(user.id, &draft)
        .await?;

    tracing::info!(user_id = user.id, username = %updated.username, "Profile updated");
    Ok(Redirect::to(&paths::profile(&updated.username)).into_response())
}

/// Profile routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile/edit/", get(edit_profile_form).post(edit_profile))
        .route("/profile/{username}/", get(profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn edit_form_is_prefilled() {
        let user = User {
            id: 3,
            username: "anna".into(),
            first_name: "Anna".into(),
            last_name: "Karenina".into(),
            email: None,
            date_joined: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        };

        let form = form_from_user(&user);
        assert_eq!(form.username, "anna");
        assert_eq!(form.last_name, "Karenina");
        assert_eq!(form.email, "");

        let draft = ProfileDraft::new(&form).unwrap();
        assert_eq!(draft.username.as_str(), "anna");
        assert_eq!(draft.email, None);
    }
}
