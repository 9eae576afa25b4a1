//! Comment endpoints: add, edit, delete

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;

use super::paths;
use crate::db::repos::{Comment, CommentRepo, PostRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{LoginRequired, Viewer};
use crate::http::server::AppState;
use crate::models::{CommentForm, CommentText};

/// GET /posts/{id}/edit_comment/{cid}/
#[derive(Serialize)]
pub struct CommentFormPage {
    pub comment: Comment,
    pub form: CommentForm,
}

/// GET /posts/{id}/delete_comment/{cid}/ - no form, just the comment
#[derive(Serialize)]
pub struct DeleteCommentPage {
    pub comment: Comment,
}

const DELETE_COMMENT_FORBIDDEN: &str = "you are not allowed to delete this comment";

/// POST /posts/{id}/comment/
///
/// An empty comment is dropped without an error; the viewer lands back on
/// the post either way.
async fn add_comment(
    State(state): State<Arc<AppState>>,
    LoginRequired(user): LoginRequired,
    Path(post_id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Result<Response, ApiError> {
    PostRepo::new(&state.pool).get(post_id).await?;

    match CommentText::new(&form.text) {
        Ok(text) => {
            let comment_id = CommentRepo::new(&state.pool)
                .create(post_id, user.id, &text)
                .await?;
            tracing::info!(post_id, comment_id, author = %user.username, "Comment added");
        }
        Err(e) => {
            tracing::debug!(post_id, "Ignoring invalid comment: {}", e);
        }
    }

    Ok(Redirect::to(&paths::post_detail(post_id)).into_response())
}

/// GET /posts/{id}/edit_comment/{cid}/
async fn edit_comment_form(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> Result<Response, ApiError> {
    let comment = CommentRepo::new(&state.pool).get(post_id, comment_id).await?;
    if !viewer.is(comment.author_id) {
        return Ok(Redirect::to(&paths::post_detail(post_id)).into_response());
    }

    Ok(Json(CommentFormPage {
        form: CommentForm {
            text: comment.text.clone(),
        },
        comment,
    })
    .into_response())
}

/// POST /posts/{id}/edit_comment/{cid}/ - authors only; others are sent to the post
async fn edit_comment(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path((post_id, comment_id)): Path<(i64, i64)>,
    Form(form): Form<CommentForm>,
) -> Result<Response, ApiError> {
    let repo = CommentRepo::new(&state.pool);
    let comment = repo.get(post_id, comment_id).await?;
    if !viewer.is(comment.author_id) {
        return Ok(Redirect::to(&paths::post_detail(post_id)).into_response());
    }

    let text = CommentText::new(&form.text)?;
    repo.update(comment_id, &text).await?;

    tracing::info!(post_id, comment_id, "Comment updated");
    Ok(Redirect::to(&paths::post_detail(post_id)).into_response())
}

/// GET /posts/{id}/delete_comment/{cid}/
async fn delete_comment_confirm(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> Result<Json<DeleteCommentPage>, ApiError> {
    let comment = CommentRepo::new(&state.pool).get(post_id, comment_id).await?;
    if !viewer.is(comment.author_id) {
        return Err(ApiError::Forbidden {
            reason: DELETE_COMMENT_FORBIDDEN,
        });
    }

    Ok(Json(DeleteCommentPage { comment }))
}

/// POST /posts/{id}/delete_comment/{cid}/
async fn delete_comment(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> Result<Response, ApiError> {
    let repo = CommentRepo::new(&state.pool);
    let comment = repo.get(post_id, comment_id).await?;
    if !viewer.is(comment.author_id) {
        return Err(ApiError::Forbidden {
            reason: DELETE_COMMENT_FORBIDDEN,
        });
    }

    repo.delete(comment_id).await?;

    tracing::info!(post_id, comment_id, "Comment deleted");
    Ok(Redirect::to(&paths::post_detail(post_id)).into_response())
}

/// Comment routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/posts/{post_id}/comment/", post(add_comment))
        .route(
            "/posts/{post_id}/edit_comment/{comment_id}/",
            get(edit_comment_form).post(edit_comment),
        )
        .route(
            "/posts/{post_id}/delete_comment/{comment_id}/",
            get(delete_comment_confirm).post(delete_comment),
        )
}
