//! Axum route handlers for the Blog API.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::blog::models::{BlogCategory, BlogPost, RelatedArticle};
use crate::errors::AppError;
use crate::state::AppState;

const DEFAULT_POSTS_LIMIT: usize = 10;
const DEFAULT_FEATURED_LIMIT: usize = 3;
const DEFAULT_RELATED_LIMIT: usize = 3;

#[derive(Debug, Deserialize)]
pub struct PostsQuery {
    pub limit: Option<usize>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<usize>,
}

/// GET /api/blog/posts
pub async fn handle_list_posts(
    State(state): State<AppState>,
    query: Result<Query<PostsQuery>, QueryRejection>,
) -> Result<Json<Vec<BlogPost>>, AppError> {
    let Query(params) = query?;
    let category = params.category.as_deref().filter(|c| !c.is_empty());
    let posts = state
        .blog
        .posts(params.limit.unwrap_or(DEFAULT_POSTS_LIMIT), category)
        .await;
    Ok(Json(posts))
}

/// GET /api/blog/posts/:slug
pub async fn handle_get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BlogPost>, AppError> {
    state
        .blog
        .post_by_slug(&slug)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Post '{slug}' not found")))
}

/// GET /api/blog/posts/:slug/related
pub async fn handle_related_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<Json<Vec<RelatedArticle>>, AppError> {
    let Query(params) = query?;
    state
        .blog
        .related(&slug, params.limit.unwrap_or(DEFAULT_RELATED_LIMIT))
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Post '{slug}' not found")))
}

/// GET /api/blog/categories
pub async fn handle_list_categories(State(state): State<AppState>) -> Json<Vec<BlogCategory>> {
    Json(state.blog.categories().await)
}

/// GET /api/blog/featured
pub async fn handle_featured_posts(
    State(state): State<AppState>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<Json<Vec<BlogPost>>, AppError> {
    let Query(params) = query?;
    Ok(Json(
        state
            .blog
            .featured(params.limit.unwrap_or(DEFAULT_FEATURED_LIMIT))
            .await,
    ))
}

/// GET /api/blog/search
pub async fn handle_search_posts(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<BlogPost>>, AppError> {
    let Query(params) = query?;
    let query = params.q.as_deref().map(str::trim).unwrap_or("");
    if query.is_empty() {
        return Err(AppError::Validation("Query parameter 'q' is required".to_string()));
    }
    Ok(Json(
        state
            .blog
            .search(query, params.limit.unwrap_or(DEFAULT_POSTS_LIMIT))
            .await,
    ))
}
