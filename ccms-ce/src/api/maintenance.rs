//! Operator maintenance endpoints

use axum::{extract::State, Json};
use ccms_common::api::types::RecalcSummary;

use crate::api::ApiError;
use crate::engine::reconciler;
use crate::AppState;

/// POST /api/maintenance/recalculate
///
/// Full-tree recomputation of every derived duration. Idempotent; per-entity
/// failures are reported in the summary rather than failing the request.
pub async fn recalculate_all(
    State(state): State<AppState>,
) -> Result<Json<RecalcSummary>, ApiError> {
    let summary = reconciler::recalculate_all(&state.db).await?;
    Ok(Json(summary))
}
