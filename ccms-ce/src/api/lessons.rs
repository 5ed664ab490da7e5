//! Lesson endpoints
//!
//! Includes the video leaf-estimate write; the response carries the lesson's
//! total as recomputed before the response is built.

use axum::{
    extract::{Path, State},
    Json,
};
use ccms_common::api::types::{
    CreateLessonRequest, LessonResponse, SetLessonVideoRequest, UpdateLessonRequest,
};
use ccms_common::db::models::Lesson;
use ccms_common::duration::format_minutes;
use uuid::Uuid;

use crate::api::ApiError;
use crate::engine::mutations;
use crate::{db, AppState};

pub(crate) fn lesson_response(lesson: Lesson) -> LessonResponse {
    LessonResponse {
        lesson_id: lesson.guid,
        module_id: lesson.module_id,
        title: lesson.title,
        order_index: lesson.order_index,
        video_seconds: lesson.video_seconds,
        total_duration_minutes: lesson.total_duration_minutes,
        duration_display: format_minutes(lesson.total_duration_minutes),
    }
}

/// POST /api/modules/:module_id/lessons
pub async fn create_lesson(
    State(state): State<AppState>,
    Path(module_id): Path<Uuid>,
    Json(request): Json<CreateLessonRequest>,
) -> Result<Json<LessonResponse>, ApiError> {
    let lesson = mutations::create_lesson(&state.db, &state.guard, module_id, request).await?;
    Ok(Json(lesson_response(lesson)))
}

/// GET /api/modules/:module_id/lessons
pub async fn list_lessons(
    State(state): State<AppState>,
    Path(module_id): Path<Uuid>,
) -> Result<Json<Vec<LessonResponse>>, ApiError> {
    if db::modules::get_module(&state.db, module_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("module {}", module_id)));
    }

    let lessons = db::lessons::list_lessons_for_module(&state.db, module_id).await?;
    Ok(Json(lessons.into_iter().map(lesson_response).collect()))
}

/// GET /api/lessons/:lesson_id
pub async fn get_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
) -> Result<Json<LessonResponse>, ApiError> {
    let lesson = db::lessons::get_lesson(&state.db, lesson_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("lesson {}", lesson_id)))?;
    Ok(Json(lesson_response(lesson)))
}

/// PATCH /api/lessons/:lesson_id - metadata only, never touches durations
pub async fn update_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
    Json(request): Json<UpdateLessonRequest>,
) -> Result<Json<LessonResponse>, ApiError> {
    let lesson =
        mutations::update_lesson_meta(&state.db, lesson_id, request.title, request.order_index)
            .await?;
    Ok(Json(lesson_response(lesson)))
}

/// DELETE /api/lessons/:lesson_id - cascades to materials and activities
pub async fn delete_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    mutations::delete_lesson(&state.db, &state.guard, lesson_id).await?;
    Ok(Json(serde_json::json!({ "status": "deleted" })))
}

/// PUT /api/lessons/:lesson_id/video - authoritative video estimate write
pub async fn set_lesson_video(
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
    Json(request): Json<SetLessonVideoRequest>,
) -> Result<Json<LessonResponse>, ApiError> {
    let lesson =
        mutations::set_lesson_video(&state.db, &state.guard, lesson_id, request).await?;
    Ok(Json(lesson_response(lesson)))
}
