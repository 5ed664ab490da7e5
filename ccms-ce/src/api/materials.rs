//! Material endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use ccms_common::api::types::{CreateMaterialRequest, MaterialResponse, UpdateMaterialRequest};
use ccms_common::db::models::Material;
use uuid::Uuid;

use crate::api::ApiError;
use crate::engine::mutations;
use crate::{db, AppState};

pub(crate) fn material_response(material: Material) -> MaterialResponse {
    MaterialResponse {
        material_id: material.guid,
        lesson_id: material.lesson_id,
        title: material.title,
        material_type: material.material_type,
        order_index: material.order_index,
        estimated_minutes: material.estimated_minutes,
    }
}

/// POST /api/lessons/:lesson_id/materials
pub async fn create_material(
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
    Json(request): Json<CreateMaterialRequest>,
) -> Result<Json<MaterialResponse>, ApiError> {
    let material =
        mutations::create_material(&state.db, &state.guard, lesson_id, request).await?;
    Ok(Json(material_response(material)))
}

/// GET /api/lessons/:lesson_id/materials
pub async fn list_materials(
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
) -> Result<Json<Vec<MaterialResponse>>, ApiError> {
    if db::lessons::get_lesson(&state.db, lesson_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("lesson {}", lesson_id)));
    }

    let materials = db::materials::list_materials_for_lesson(&state.db, lesson_id).await?;
    Ok(Json(materials.into_iter().map(material_response).collect()))
}

/// PUT /api/materials/:material_id
pub async fn update_material(
    State(state): State<AppState>,
    Path(material_id): Path<Uuid>,
    Json(request): Json<UpdateMaterialRequest>,
) -> Result<Json<MaterialResponse>, ApiError> {
    let material =
        mutations::update_material(&state.db, &state.guard, material_id, request).await?;
    Ok(Json(material_response(material)))
}

/// DELETE /api/materials/:material_id
pub async fn delete_material(
    State(state): State<AppState>,
    Path(material_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    mutations::delete_material(&state.db, &state.guard, material_id).await?;
    Ok(Json(serde_json::json!({ "status": "deleted" })))
}
