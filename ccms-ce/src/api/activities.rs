//! Activity endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use ccms_common::api::types::{ActivityResponse, CreateActivityRequest, UpdateActivityRequest};
use ccms_common::db::models::Activity;
use uuid::Uuid;

use crate::api::ApiError;
use crate::engine::mutations;
use crate::{db, AppState};

pub(crate) fn activity_response(activity: Activity) -> ActivityResponse {
    ActivityResponse {
        activity_id: activity.guid,
        lesson_id: activity.lesson_id,
        title: activity.title,
        activity_type: activity.activity_type,
        order_index: activity.order_index,
        estimated_minutes: activity.estimated_minutes,
    }
}

/// POST /api/lessons/:lesson_id/activities
pub async fn create_activity(
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
    Json(request): Json<CreateActivityRequest>,
) -> Result<Json<ActivityResponse>, ApiError> {
    let activity =
        mutations::create_activity(&state.db, &state.guard, lesson_id, request).await?;
    Ok(Json(activity_response(activity)))
}

/// GET /api/lessons/:lesson_id/activities
pub async fn list_activities(
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
) -> Result<Json<Vec<ActivityResponse>>, ApiError> {
    if db::lessons::get_lesson(&state.db, lesson_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("lesson {}", lesson_id)));
    }

    let activities = db::activities::list_activities_for_lesson(&state.db, lesson_id).await?;
    Ok(Json(activities.into_iter().map(activity_response).collect()))
}

/// PUT /api/activities/:activity_id
pub async fn update_activity(
    State(state): State<AppState>,
    Path(activity_id): Path<Uuid>,
    Json(request): Json<UpdateActivityRequest>,
) -> Result<Json<ActivityResponse>, ApiError> {
    let activity =
        mutations::update_activity(&state.db, &state.guard, activity_id, request).await?;
    Ok(Json(activity_response(activity)))
}

/// DELETE /api/activities/:activity_id
pub async fn delete_activity(
    State(state): State<AppState>,
    Path(activity_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    mutations::delete_activity(&state.db, &state.guard, activity_id).await?;
    Ok(Json(serde_json::json!({ "status": "deleted" })))
}
