//! Module endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use ccms_common::api::types::{CreateModuleRequest, ModuleResponse, UpdateModuleRequest};
use ccms_common::db::models::CourseModule;
use ccms_common::duration::format_minutes;
use uuid::Uuid;

use crate::api::ApiError;
use crate::engine::mutations;
use crate::{db, AppState};

pub(crate) fn module_response(module: CourseModule) -> ModuleResponse {
    ModuleResponse {
        module_id: module.guid,
        course_id: module.course_id,
        title: module.title,
        order_index: module.order_index,
        duration_minutes: module.duration_minutes,
        duration_display: format_minutes(module.duration_minutes),
    }
}

/// POST /api/courses/:course_id/modules
pub async fn create_module(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(request): Json<CreateModuleRequest>,
) -> Result<Json<ModuleResponse>, ApiError> {
    let module = mutations::create_module(&state.db, course_id, request.title).await?;
    Ok(Json(module_response(module)))
}

/// GET /api/courses/:course_id/modules
pub async fn list_modules(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<ModuleResponse>>, ApiError> {
    if db::courses::get_course(&state.db, course_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("course {}", course_id)));
    }

    let modules = db::modules::list_modules_for_course(&state.db, course_id).await?;
    Ok(Json(modules.into_iter().map(module_response).collect()))
}

/// GET /api/modules/:module_id
pub async fn get_module(
    State(state): State<AppState>,
    Path(module_id): Path<Uuid>,
) -> Result<Json<ModuleResponse>, ApiError> {
    let module = db::modules::get_module(&state.db, module_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("module {}", module_id)))?;
    Ok(Json(module_response(module)))
}

/// PATCH /api/modules/:module_id - metadata only, never touches durations
pub async fn update_module(
    State(state): State<AppState>,
    Path(module_id): Path<Uuid>,
    Json(request): Json<UpdateModuleRequest>,
) -> Result<Json<ModuleResponse>, ApiError> {
    let module =
        mutations::update_module_meta(&state.db, module_id, request.title, request.order_index)
            .await?;
    Ok(Json(module_response(module)))
}

/// DELETE /api/modules/:module_id - cascades to lessons and leaves
pub async fn delete_module(
    State(state): State<AppState>,
    Path(module_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    mutations::delete_module(&state.db, &state.guard, module_id).await?;
    Ok(Json(serde_json::json!({ "status": "deleted" })))
}
