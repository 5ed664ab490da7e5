//! Course endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use ccms_common::api::types::{CourseResponse, CreateCourseRequest};
use ccms_common::db::models::Course;
use ccms_common::duration::format_minutes;
use uuid::Uuid;

use crate::api::ApiError;
use crate::engine::mutations;
use crate::{db, AppState};

pub(crate) fn course_response(course: Course) -> CourseResponse {
    CourseResponse {
        course_id: course.guid,
        title: course.title,
        duration_total_minutes: course.duration_total_minutes,
        duration_display: format_minutes(course.duration_total_minutes),
    }
}

/// POST /api/courses
pub async fn create_course(
    State(state): State<AppState>,
    Json(request): Json<CreateCourseRequest>,
) -> Result<Json<CourseResponse>, ApiError> {
    let course = mutations::create_course(&state.db, request.title).await?;
    Ok(Json(course_response(course)))
}

/// GET /api/courses/:course_id
pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<CourseResponse>, ApiError> {
    let course = db::courses::get_course(&state.db, course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("course {}", course_id)))?;
    Ok(Json(course_response(course)))
}
