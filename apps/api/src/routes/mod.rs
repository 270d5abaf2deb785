pub mod health;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::blog::handlers as blog;
use crate::errors::AppError;
use crate::optimizer::handlers as optimizer;
use crate::state::AppState;
use crate::tenant::{self, handlers as profiles};

async fn not_found() -> AppError {
    AppError::NotFound("No such route".to_string())
}

/// The tenant middleware wraps every route and the fallback, so tenant hosts
/// are answered before any platform route is matched.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Blog API
        .route("/api/blog/posts", get(blog::handle_list_posts))
        .route("/api/blog/posts/:slug", get(blog::handle_get_post))
        .route(
            "/api/blog/posts/:slug/related",
            get(blog::handle_related_posts),
        )
        .route("/api/blog/categories", get(blog::handle_list_categories))
        .route("/api/blog/featured", get(blog::handle_featured_posts))
        .route("/api/blog/search", get(blog::handle_search_posts))
        // Profile API
        .route("/api/profiles/:slug", get(profiles::handle_get_profile))
        .route(
            "/api/profiles/:slug/downloads",
            post(profiles::handle_record_download),
        )
        // Content optimization
        .route("/api/optimize", post(optimizer::handle_optimize))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            tenant::tenant_routing,
        ))
        .with_state(state)
}
