//! Activity database operations
//!
//! `estimated_minutes` is the authoritative leaf estimate.

use ccms_common::api::types::ActivityType;
use ccms_common::db::models::Activity;
use ccms_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Create a new activity appended at the end of its lesson
pub fn new_activity(
    lesson_id: Uuid,
    title: String,
    activity_type: ActivityType,
    estimated_minutes: i64,
    order_index: i64,
) -> Activity {
    Activity {
        guid: Uuid::new_v4(),
        lesson_id,
        title,
        activity_type,
        order_index,
        estimated_minutes,
    }
}

/// Next free order index within a lesson
pub async fn next_order_index(pool: &SqlitePool, lesson_id: Uuid) -> Result<i64> {
    let next: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(order_index) + 1, 0) FROM lesson_activities WHERE lesson_id = ?",
    )
    .bind(lesson_id.to_string())
    .fetch_one(pool)
    .await?;
    Ok(next)
}

pub async fn insert_activity(pool: &SqlitePool, activity: &Activity) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO lesson_activities
            (guid, lesson_id, title, activity_type, order_index, estimated_minutes, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(activity.guid.to_string())
    .bind(activity.lesson_id.to_string())
    .bind(&activity.title)
    .bind(activity.activity_type.as_str())
    .bind(activity.order_index)
    .bind(activity.estimated_minutes)
    .execute(pool)
    .await?;

    Ok(())
}

fn activity_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Activity> {
    let guid: String = row.get("guid");
    let lesson_id: String = row.get("lesson_id");
    let activity_type: String = row.get("activity_type");
    Ok(Activity {
        guid: Uuid::parse_str(&guid).map_err(|e| Error::Internal(e.to_string()))?,
        lesson_id: Uuid::parse_str(&lesson_id).map_err(|e| Error::Internal(e.to_string()))?,
        title: row.get("title"),
        activity_type: ActivityType::parse(&activity_type)
            .ok_or_else(|| Error::Internal(format!("unknown activity type: {}", activity_type)))?,
        order_index: row.get("order_index"),
        estimated_minutes: row.get("estimated_minutes"),
    })
}

pub async fn get_activity(pool: &SqlitePool, id: Uuid) -> Result<Option<Activity>> {
    let row = sqlx::query(
        r#"
        SELECT guid, lesson_id, title, activity_type, order_index, estimated_minutes
        FROM lesson_activities
        WHERE guid = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(activity_from_row).transpose()
}

pub async fn list_activities_for_lesson(pool: &SqlitePool, lesson_id: Uuid) -> Result<Vec<Activity>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, lesson_id, title, activity_type, order_index, estimated_minutes
        FROM lesson_activities
        WHERE lesson_id = ?
        ORDER BY order_index
        "#,
    )
    .bind(lesson_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(activity_from_row).collect()
}

/// Partial update; returns false when the activity does not exist
pub async fn update_activity(
    pool: &SqlitePool,
    id: Uuid,
    title: Option<&str>,
    activity_type: Option<ActivityType>,
    estimated_minutes: Option<i64>,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE lesson_activities
        SET title = COALESCE(?, title),
            activity_type = COALESCE(?, activity_type),
            estimated_minutes = COALESCE(?, estimated_minutes),
            updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(title)
    .bind(activity_type.map(|t| t.as_str()))
    .bind(estimated_minutes)
    .bind(id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete an activity.
///
/// Returns the owning lesson id so the caller can recompute the chain, or
/// None when the activity does not exist.
pub async fn delete_activity(pool: &SqlitePool, id: Uuid) -> Result<Option<Uuid>> {
    let Some(activity) = get_activity(pool, id).await? else {
        return Ok(None);
    };

    sqlx::query("DELETE FROM lesson_activities WHERE guid = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(Some(activity.lesson_id))
}
