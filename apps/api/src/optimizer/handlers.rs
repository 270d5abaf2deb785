use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::optimizer::{OptimizationReport, OptimizerError, ProfileSnapshot};
use crate::state::AppState;

/// POST /api/optimize
pub async fn handle_optimize(
    State(state): State<AppState>,
    Json(snapshot): Json<ProfileSnapshot>,
) -> Result<Json<OptimizationReport>, AppError> {
    if snapshot.display_name.trim().is_empty() {
        return Err(AppError::Validation("displayName is required".to_string()));
    }
    let optimizer = state.optimizer.as_ref().ok_or_else(|| {
        AppError::NotConfigured("Content optimization is not configured".to_string())
    })?;
    let report = optimizer.optimize(&snapshot).await?;
    Ok(Json(report))
}

impl From<OptimizerError> for AppError {
    fn from(e: OptimizerError) -> Self {
        AppError::Upstream(e.to_string())
    }
}
