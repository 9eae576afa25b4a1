//! Category listing endpoint

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;

use super::posts::{listing_page, PostSummary};
use crate::db::repos::{Category, CategoryRepo, PostQuery, PostScope};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::{PageParams, Paginated};

/// GET /category/{slug}/
#[derive(Serialize)]
pub struct CategoryPage {
    pub category: Category,
    pub page: Paginated<PostSummary>,
}

/// Published posts of a published category; hidden categories are 404.
async fn category_posts(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<CategoryPage>, ApiError> {
    let category = CategoryRepo::new(&state.pool)
        .published_by_slug(&slug)
        .await?;

    let query = PostQuery::published(PostScope::Category(category.id), Utc::now());
    let page = listing_page(&state, query, &params).await?;

    Ok(Json(CategoryPage { category, page }))
}

/// Category routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/category/{slug}/", get(category_posts))
}
