//! Module database operations

use ccms_common::db::models::CourseModule;
use ccms_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Create a new module appended at the end of its course
pub fn new_module(course_id: Uuid, title: String, order_index: i64) -> CourseModule {
    CourseModule {
        guid: Uuid::new_v4(),
        course_id,
        title,
        order_index,
        duration_minutes: 0,
    }
}

/// Next free order index within a course
pub async fn next_order_index(pool: &SqlitePool, course_id: Uuid) -> Result<i64> {
    let next: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(order_index) + 1, 0) FROM course_modules WHERE course_id = ?",
    )
    .bind(course_id.to_string())
    .fetch_one(pool)
    .await?;
    Ok(next)
}

pub async fn insert_module(pool: &SqlitePool, module: &CourseModule) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO course_modules (guid, course_id, title, order_index, created_at, updated_at)
        VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(module.guid.to_string())
    .bind(module.course_id.to_string())
    .bind(&module.title)
    .bind(module.order_index)
    .execute(pool)
    .await?;

    Ok(())
}

fn module_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<CourseModule> {
    let guid: String = row.get("guid");
    let course_id: String = row.get("course_id");
    Ok(CourseModule {
        guid: Uuid::parse_str(&guid).map_err(|e| Error::Internal(e.to_string()))?,
        course_id: Uuid::parse_str(&course_id).map_err(|e| Error::Internal(e.to_string()))?,
        title: row.get("title"),
        order_index: row.get("order_index"),
        duration_minutes: row.get("duration_minutes"),
    })
}

pub async fn get_module(pool: &SqlitePool, id: Uuid) -> Result<Option<CourseModule>> {
    let row = sqlx::query(
        "SELECT guid, course_id, title, order_index, duration_minutes FROM course_modules WHERE guid = ?",
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(module_from_row).transpose()
}

pub async fn list_modules_for_course(pool: &SqlitePool, course_id: Uuid) -> Result<Vec<CourseModule>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, course_id, title, order_index, duration_minutes
        FROM course_modules
        WHERE course_id = ?
        ORDER BY order_index
        "#,
    )
    .bind(course_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(module_from_row).collect()
}

/// Metadata-only update; returns false when the module does not exist
pub async fn update_module_meta(
    pool: &SqlitePool,
    id: Uuid,
    title: Option<&str>,
    order_index: Option<i64>,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE course_modules
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

/// Delete a module and (via FK cascade) its whole subtree.
///
/// Returns the owning course id so the caller can recompute the remaining
/// chain, or None when the module does not exist.
pub async fn delete_module(pool: &SqlitePool, id: Uuid) -> Result<Option<Uuid>> {
    let Some(module) = get_module(pool, id).await? else {
        return Ok(None);
    };

    sqlx::query("DELETE FROM course_modules WHERE guid = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(Some(module.course_id))
}
