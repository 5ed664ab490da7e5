//! Lesson database operations
//!
//! `video_seconds` is the authoritative leaf estimate; `total_duration_minutes`
//! is derived and owned by the engine.

use ccms_common::db::models::Lesson;
use ccms_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Create a new lesson appended at the end of its module
pub fn new_lesson(module_id: Uuid, title: String, video_seconds: i64, order_index: i64) -> Lesson {
    Lesson {
        guid: Uuid::new_v4(),
        module_id,
        title,
        order_index,
        video_seconds,
        total_duration_minutes: 0,
    }
}

/// Next free order index within a module
pub async fn next_order_index(pool: &SqlitePool, module_id: Uuid) -> Result<i64> {
    let next: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(order_index) + 1, 0) FROM course_lessons WHERE module_id = ?",
    )
    .bind(module_id.to_string())
    .fetch_one(pool)
    .await?;
    Ok(next)
}

pub async fn insert_lesson(pool: &SqlitePool, lesson: &Lesson) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO course_lessons (guid, module_id, title, order_index, video_seconds, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(lesson.guid.to_string())
    .bind(lesson.module_id.to_string())
    .bind(&lesson.title)
    .bind(lesson.order_index)
    .bind(lesson.video_seconds)
    .execute(pool)
    .await?;

    Ok(())
}

fn lesson_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Lesson> {
    let guid: String = row.get("guid");
    let module_id: String = row.get("module_id");
    Ok(Lesson {
        guid: Uuid::parse_str(&guid).map_err(|e| Error::Internal(e.to_string()))?,
        module_id: Uuid::parse_str(&module_id).map_err(|e| Error::Internal(e.to_string()))?,
        title: row.get("title"),
        order_index: row.get("order_index"),
        video_seconds: row.get("video_seconds"),
        total_duration_minutes: row.get("total_duration_minutes"),
    })
}

pub async fn get_lesson(pool: &SqlitePool, id: Uuid) -> Result<Option<Lesson>> {
    let row = sqlx::query(
        r#"
        SELECT guid, module_id, title, order_index, video_seconds, total_duration_minutes
        FROM course_lessons
        WHERE guid = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(lesson_from_row).transpose()
}

pub async fn list_lessons_for_module(pool: &SqlitePool, module_id: Uuid) -> Result<Vec<Lesson>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, module_id, title, order_index, video_seconds, total_duration_minutes
        FROM course_lessons
        WHERE module_id = ?
        ORDER BY order_index
        "#,
    )
    .bind(module_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(lesson_from_row).collect()
}

/// Metadata-only update; returns false when the lesson does not exist
pub async fn update_lesson_meta(
    pool: &SqlitePool,
    id: Uuid,
    title: Option<&str>,
    order_index: Option<i64>,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE course_lessons
        SET title = COALESCE(?, title),
            order_index = COALESCE(?, order_index),
            updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(title)
    .bind(order_index)
    .bind(id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Write the authoritative video estimate; returns false when the lesson
/// does not exist
pub async fn set_video_seconds(pool: &SqlitePool, id: Uuid, video_seconds: i64) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE course_lessons SET video_seconds = ?, updated_at = CURRENT_TIMESTAMP WHERE guid = ?",
    )
    .bind(video_seconds)
    .bind(id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a lesson and (via FK cascade) its materials and activities.
///
/// Returns the owning module id so the caller can recompute the remaining
/// chain, or None when the lesson does not exist.
pub async fn delete_lesson(pool: &SqlitePool, id: Uuid) -> Result<Option<Uuid>> {
    let Some(lesson) = get_lesson(pool, id).await? else {
        return Ok(None);
    };

    sqlx::query("DELETE FROM course_lessons WHERE guid = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(Some(lesson.module_id))
}
