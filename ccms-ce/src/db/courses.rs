//! Course database operations

use ccms_common::db::models::Course;
use ccms_common::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Create a new course with a zero derived total
pub fn new_course(title: String) -> Course {
    Course {
        guid: Uuid::new_v4(),
        title,
        duration_total_minutes: 0,
    }
}

pub async fn insert_course(pool: &SqlitePool, course: &Course) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO courses (guid, title, created_at, updated_at)
        VALUES (?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(course.guid.to_string())
    .bind(&course.title)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_course(pool: &SqlitePool, id: Uuid) -> Result<Option<Course>> {
    let row = sqlx::query("SELECT guid, title, duration_total_minutes FROM courses WHERE guid = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let guid: String = row.get("guid");
            Ok(Some(Course {
                guid: Uuid::parse_str(&guid)
                    .map_err(|e| ccms_common::Error::Internal(e.to_string()))?,
                title: row.get("title"),
                duration_total_minutes: row.get("duration_total_minutes"),
            }))
        }
        None => Ok(None),
    }
}
