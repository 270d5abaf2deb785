use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::errors::AppError;
use crate::models::profile::PublicProfile;
use crate::state::AppState;

/// GET /api/profiles/:slug
/// Published profile as JSON, for clients that navigate without a full page load.
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PublicProfile>, AppError> {
    state
        .profiles
        .profile_by_slug(&slug)
        .await?
        .map(|profile| Json(PublicProfile::from(&profile)))
        .ok_or_else(|| AppError::NotFound(format!("Profile '{slug}' not found")))
}

/// POST /api/profiles/:slug/downloads
/// Counts a CV download.
pub async fn handle_record_download(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, AppError> {
    let profile = state
        .profiles
        .profile_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile '{slug}' not found")))?;
    state.profiles.increment_download_count(profile.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
