//! Post endpoints: index, detail, create, edit, delete

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::paths;
use crate::db::repos::{
    Category, CategoryRef, CategoryRepo, Comment, CommentRepo, Location, LocationRepo, Post,
    PostQuery, PostRepo, PostScope, PostWithCount,
};
use crate::http::error::ApiError;
use crate::http::extractors::{LoginRequired, Viewer};
use crate::http::server::AppState;
use crate::models::{CommentForm, PageParams, Paginated, PostDraft, PostForm};

const PUB_DATE_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Post as shown in listings
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author: String,
    pub category: Option<CategoryRef>,
    /// Only published locations are shown
    pub location: Option<String>,
    pub is_published: bool,
    pub comment_count: i64,
}

impl From<PostWithCount> for PostSummary {
    fn from(p: PostWithCount) -> Self {
        let PostView {
            id,
            title,
            text,
            pub_date,
            author,
            category,
            location,
            is_published,
            ..
        } = PostView::from(p.post);

        Self {
            id,
            title,
            text,
            pub_date,
            author,
            category,
            location,
            is_published,
            comment_count: p.comment_count,
        }
    }
}

/// Post as shown on its own page
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub author: String,
    pub category: Option<CategoryRef>,
    pub location: Option<String>,
    pub is_published: bool,
}

impl From<Post> for PostView {
    fn from(p: Post) -> Self {
        Self {
            id: p.id,
            title: p.title,
            text: p.text,
            pub_date: p.pub_date,
            created_at: p.created_at,
            author: p.author_username,
            category: p.category,
            location: p.location.filter(|l| l.is_published).map(|l| l.name),
            is_published: p.is_published,
        }
    }
}

/// GET /posts/{id}/
#[derive(Serialize)]
pub struct PostDetailPage {
    pub post: PostView,
    pub comments: Vec<Comment>,
    /// Empty comment form
    pub form: CommentForm,
    pub can_edit: bool,
}

/// GET /posts/create/ and /posts/{id}/edit/
#[derive(Serialize)]
pub struct PostFormPage {
    pub post_id: Option<i64>,
    pub form: PostForm,
    pub categories: Vec<Category>,
    pub locations: Vec<Location>,
}

/// GET /posts/{id}/delete/
#[derive(Serialize)]
pub struct DeletePostPage {
    pub post: PostView,
}

/// Fetch one page of a listing, mapping a bad or past-the-end page to 404.
pub(super) async fn listing_page(
    state: &AppState,
    query: PostQuery,
    params: &PageParams,
) -> Result<Paginated<PostSummary>, ApiError> {
    let page_not_found = || ApiError::not_found("page", params.page.as_deref().unwrap_or("1"));

    let request = params.request().ok_or_else(page_not_found)?;
    let page = PostRepo::new(&state.pool)
        .page(&query, request, state.config.posts_per_page)
        .await?
        .ok_or_else(page_not_found)?;

    Ok(page.map(PostSummary::from))
}

/// Prefill the form from a stored post.
fn form_from_post(post: &Post) -> PostForm {
    PostForm {
        title: post.title.clone(),
        text: post.text.clone(),
        pub_date: post.pub_date.format(PUB_DATE_INPUT_FORMAT).to_string(),
        category: post
            .category
            .as_ref()
            .map(|c| c.id.to_string())
            .unwrap_or_default(),
        location: post
            .location
            .as_ref()
            .map(|l| l.id.to_string())
            .unwrap_or_default(),
        is_published: post.is_published.then(|| "on".to_string()),
    }
}

/// Blank form for a new post: publish now, checkbox ticked.
fn blank_form(now: DateTime<Utc>) -> PostForm {
    PostForm {
        pub_date: now.format(PUB_DATE_INPUT_FORMAT).to_string(),
        is_published: Some("on".to_string()),
        ..PostForm::default()
    }
}

async fn form_page(
    state: &AppState,
    post_id: Option<i64>,
    form: PostForm,
) -> Result<PostFormPage, ApiError> {
    Ok(PostFormPage {
        post_id,
        form,
        categories: CategoryRepo::new(&state.pool).list().await?,
        locations: LocationRepo::new(&state.pool).list().await?,
    })
}

/// GET / - published posts, newest first
async fn index(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> Result<Response, ApiError> {
    let request = params
        .request()
        .ok_or_else(|| ApiError::not_found("page", params.page.as_deref().unwrap_or("1")))?;

    if let Some(page) = state.index_cache.get(&request).await {
        return Ok(Json(&*page).into_response());
    }

    let generation = state.index_cache.generation();
    let query = PostQuery::published(PostScope::All, Utc::now());
    let page = listing_page(&state, query, &params).await?;
    let page = state.index_cache.insert(request, page, generation).await;

    Ok(Json(&*page).into_response())
}

/// GET /posts/{id}/ - one post with its comments
async fn post_detail(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path(post_id): Path<i64>,
) -> Result<Json<PostDetailPage>, ApiError> {
    let post = PostRepo::new(&state.pool).get(post_id).await?;

    if !post
        .visibility()
        .visible_to(post.author_id, viewer.id(), Utc::now())
    {
        return Err(ApiError::not_found("post", post_id));
    }

    let comments = CommentRepo::new(&state.pool).list_for_post(post_id).await?;

    Ok(Json(PostDetailPage {
        can_edit: viewer.is(post.author_id),
        post: PostView::from(post),
        comments,
        form: CommentForm::default(),
    }))
}

/// GET /posts/create/
async fn create_form(
    State(state): State<Arc<AppState>>,
    LoginRequired(_user): LoginRequired,
) -> Result<Json<PostFormPage>, ApiError> {
    let page = form_page(&state, None, blank_form(Utc::now())).await?;
    Ok(Json(page))
}

/// POST /posts/create/ - the viewer becomes the author
async fn create_post(
    State(state): State<Arc<AppState>>,
    LoginRequired(user): LoginRequired,
    Form(form): Form<PostForm>,
) -> Result<Response, ApiError> {
    let draft = PostDraft::new(&form)?;
    let post_id = PostRepo::new(&state.pool).create(user.id, &draft).await?;

    tracing::info!(post_id, author = %user.username, "Post created");
    Ok(Redirect::to(&paths::profile(&user.username)).into_response())
}

/// GET /posts/{id}/edit/
async fn edit_form(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path(post_id): Path<i64>,
) -> Result<Response, ApiError> {
    let post = PostRepo::new(&state.pool).get(post_id).await?;
    if !viewer.is(post.author_id) {
        return Ok(Redirect::to(&paths::post_detail(post_id)).into_response());
    }

    let page = form_page(&state, Some(post_id), form_from_post(&post)).await?;
    Ok(Json(page).into_response())
}

/// POST /posts/{id}/edit/ - authors only; others are sent to the post
async fn edit_post(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path(post_id): Path<i64>,
    Form(form): Form<PostForm>,
) -> Result<Response, ApiError> {
    let repo = PostRepo::new(&state.pool);
    let post = repo.get(post_id).await?;
    if !viewer.is(post.author_id) {
        return Ok(Redirect::to(&paths::post_detail(post_id)).into_response());
    }

    let draft = PostDraft::new(&form)?;
    repo.update(post_id, &draft).await?;

    tracing::info!(post_id, "Post updated");
    Ok(Redirect::to(&paths::post_detail(post_id)).into_response())
}

const DELETE_POST_FORBIDDEN: &str = "you are not allowed to delete this post";

/// GET /posts/{id}/delete/ - confirmation page
async fn delete_confirm(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path(post_id): Path<i64>,
) -> Result<Json<DeletePostPage>, ApiError> {
    let post = PostRepo::new(&state.pool).get(post_id).await?;
    if !viewer.is(post.author_id) {
        return Err(ApiError::Forbidden {
            reason: DELETE_POST_FORBIDDEN,
        });
    }

    Ok(Json(DeletePostPage {
        post: PostView::from(post),
    }))
}

/// POST /posts/{id}/delete/ - removes the post and its comments
async fn delete_post(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path(post_id): Path<i64>,
) -> Result<Response, ApiError> {
    let repo = PostRepo::new(&state.pool);
    let post = repo.get(post_id).await?;
    if !viewer.is(post.author_id) {
        return Err(ApiError::Forbidden {
            reason: DELETE_POST_FORBIDDEN,
        });
    }

    repo.delete_with_comments(post_id).await?;
    state.index_cache.clear().await;

    tracing::info!(post_id, "Post deleted");
    Ok(Redirect::to(&paths::index()).into_response())
}

/// Post routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/posts/create/", get(create_form).post(create_post))
        .route("/posts/{post_id}/", get(post_detail))
        .route("/posts/{post_id}/edit/", get(edit_form).post(edit_post))
        .route(
            "/posts/{post_id}/delete/",
            get(delete_confirm).post(delete_post),
        )
}
