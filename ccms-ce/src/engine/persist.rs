//! Derived-value persistence
//!
//! The only reads and writes of derived duration columns in the workspace.
//! Crate-private so nothing outside the engine can touch a derived field.

use ccms_common::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Aggregation inputs for one lesson: owning module, authoritative video
/// seconds, and the currently stored total
pub(crate) struct LessonInputs {
    pub module_id: Uuid,
    pub video_seconds: i64,
    pub stored_total: i64,
}

pub(crate) async fn lesson_inputs(pool: &SqlitePool, id: Uuid) -> Result<Option<LessonInputs>> {
    let row = sqlx::query(
        "SELECT module_id, video_seconds, total_duration_minutes FROM course_lessons WHERE guid = ?",
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let module_id: String = row.get("module_id");
            Ok(Some(LessonInputs {
                module_id: Uuid::parse_str(&module_id)
                    .map_err(|e| ccms_common::Error::Internal(e.to_string()))?,
                video_seconds: row.get("video_seconds"),
                stored_total: row.get("total_duration_minutes"),
            }))
        }
        None => Ok(None),
    }
}

pub(crate) async fn material_minutes(pool: &SqlitePool, lesson_id: Uuid) -> Result<Vec<i64>> {
    let minutes = sqlx::query_scalar(
        "SELECT estimated_minutes FROM lesson_materials WHERE lesson_id = ?",
    )
    .bind(lesson_id.to_string())
    .fetch_all(pool)
    .await?;
    Ok(minutes)
}

pub(crate) async fn activity_minutes(pool: &SqlitePool, lesson_id: Uuid) -> Result<Vec<i64>> {
    let minutes = sqlx::query_scalar(
        "SELECT estimated_minutes FROM lesson_activities WHERE lesson_id = ?",
    )
    .bind(lesson_id.to_string())
    .fetch_all(pool)
    .await?;
    Ok(minutes)
}

pub(crate) async fn write_lesson_total(pool: &SqlitePool, id: Uuid, minutes: i64) -> Result<()> {
    sqlx::query(
        "UPDATE course_lessons SET total_duration_minutes = ?, updated_at = CURRENT_TIMESTAMP WHERE guid = ?",
    )
    .bind(minutes)
    .bind(id.to_string())
    .execute(pool)
    .await?;
    Ok(())
}

/// Aggregation inputs for one module
pub(crate) struct ModuleInputs {
    pub course_id: Uuid,
    pub stored_total: i64,
}

pub(crate) async fn module_inputs(pool: &SqlitePool, id: Uuid) -> Result<Option<ModuleInputs>> {
    let row = sqlx::query("SELECT course_id, duration_minutes FROM course_modules WHERE guid = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let course_id: String = row.get("course_id");
            Ok(Some(ModuleInputs {
                course_id: Uuid::parse_str(&course_id)
                    .map_err(|e| ccms_common::Error::Internal(e.to_string()))?,
                stored_total: row.get("duration_minutes"),
            }))
        }
        None => Ok(None),
    }
}

pub(crate) async fn lesson_totals(pool: &SqlitePool, module_id: Uuid) -> Result<Vec<i64>> {
    let totals = sqlx::query_scalar(
        "SELECT total_duration_minutes FROM course_lessons WHERE module_id = ?",
    )
    .bind(module_id.to_string())
    .fetch_all(pool)
    .await?;
    Ok(totals)
}

pub(crate) async fn write_module_duration(pool: &SqlitePool, id: Uuid, minutes: i64) -> Result<()> {
    sqlx::query(
        "UPDATE course_modules SET duration_minutes = ?, updated_at = CURRENT_TIMESTAMP WHERE guid = ?",
    )
    .bind(minutes)
    .bind(id.to_string())
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn course_stored_total(pool: &SqlitePool, id: Uuid) -> Result<Option<i64>> {
    let stored = sqlx::query_scalar("SELECT duration_total_minutes FROM courses WHERE guid = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;
    Ok(stored)
}

pub(crate) async fn module_durations(pool: &SqlitePool, course_id: Uuid) -> Result<Vec<i64>> {
    let durations =
        sqlx::query_scalar("SELECT duration_minutes FROM course_modules WHERE course_id = ?")
            .bind(course_id.to_string())
            .fetch_all(pool)
            .await?;
    Ok(durations)
}

pub(crate) async fn write_course_total(pool: &SqlitePool, id: Uuid, minutes: i64) -> Result<()> {
    sqlx::query(
        "UPDATE courses SET duration_total_minutes = ?, updated_at = CURRENT_TIMESTAMP WHERE guid = ?",
    )
    .bind(minutes)
    .bind(id.to_string())
    .execute(pool)
    .await?;
    Ok(())
}

async fn all_ids(pool: &SqlitePool, sql: &str) -> Result<Vec<Uuid>> {
    let rows: Vec<String> = sqlx::query_scalar(sql).fetch_all(pool).await?;
    rows.iter()
        .map(|s| {
            Uuid::parse_str(s).map_err(|e| ccms_common::Error::Internal(e.to_string()))
        })
        .collect()
}

pub(crate) async fn all_lesson_ids(pool: &SqlitePool) -> Result<Vec<Uuid>> {
    all_ids(pool, "SELECT guid FROM course_lessons ORDER BY guid").await
}

pub(crate) async fn all_module_ids(pool: &SqlitePool) -> Result<Vec<Uuid>> {
    all_ids(pool, "SELECT guid FROM course_modules ORDER BY guid").await
}

pub(crate) async fn all_course_ids(pool: &SqlitePool) -> Result<Vec<Uuid>> {
    all_ids(pool, "SELECT guid FROM courses ORDER BY guid").await
}
