//! Material database operations
//!
//! `estimated_minutes` is the authoritative leaf estimate.

use ccms_common::api::types::MaterialType;
use ccms_common::db::models::Material;
use ccms_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Create a new material appended at the end of its lesson
pub fn new_material(
    lesson_id: Uuid,
    title: String,
    material_type: MaterialType,
    estimated_minutes: i64,
    order_index: i64,
) -> Material {
    Material {
        guid: Uuid::new_v4(),
        lesson_id,
        title,
        material_type,
        order_index,
        estimated_minutes,
    }
}

/// Next free order index within a lesson
pub async fn next_order_index(pool: &SqlitePool, lesson_id: Uuid) -> Result<i64> {
    let next: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(order_index) + 1, 0) FROM lesson_materials WHERE lesson_id = ?",
    )
    .bind(lesson_id.to_string())
    .fetch_one(pool)
    .await?;
    Ok(next)
}

pub async fn insert_material(pool: &SqlitePool, material: &Material) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO lesson_materials
            (guid, lesson_id, title, material_type, order_index, estimated_minutes, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(material.guid.to_string())
    .bind(material.lesson_id.to_string())
    .bind(&material.title)
    .bind(material.material_type.as_str())
    .bind(material.order_index)
    .bind(material.estimated_minutes)
    .execute(pool)
    .await?;

    Ok(())
}

fn material_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Material> {
    let guid: String = row.get("guid");
    let lesson_id: String = row.get("lesson_id");
    let material_type: String = row.get("material_type");
    Ok(Material {
        guid: Uuid::parse_str(&guid).map_err(|e| Error::Internal(e.to_string()))?,
        lesson_id: Uuid::parse_str(&lesson_id).map_err(|e| Error::Internal(e.to_string()))?,
        title: row.get("title"),
        material_type: MaterialType::parse(&material_type)
            .ok_or_else(|| Error::Internal(format!("unknown material type: {}", material_type)))?,
        order_index: row.get("order_index"),
        estimated_minutes: row.get("estimated_minutes"),
    })
}

pub async fn get_material(pool: &SqlitePool, id: Uuid) -> Result<Option<Material>> {
    let row = sqlx::query(
        r#"
        SELECT guid, lesson_id, title, material_type, order_index, estimated_minutes
        FROM lesson_materials
        WHERE guid = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(material_from_row).transpose()
}

pub async fn list_materials_for_lesson(pool: &SqlitePool, lesson_id: Uuid) -> Result<Vec<Material>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, lesson_id, title, material_type, order_index, estimated_minutes
        FROM lesson_materials
        WHERE lesson_id = ?
        ORDER BY order_index
        "#,
    )
    .bind(lesson_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(material_from_row).collect()
}

/// Partial update; returns false when the material does not exist
pub async fn update_material(
    pool: &SqlitePool,
    id: Uuid,
    title: Option<&str>,
    material_type: Option<MaterialType>,
    estimated_minutes: Option<i64>,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE lesson_materials
        SET title = COALESCE(?, title),
            material_type = COALESCE(?, material_type),
            estimated_minutes = COALESCE(?, estimated_minutes),
            updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(title)
    .bind(material_type.map(|t| t.as_str()))
    .bind(estimated_minutes)
    .bind(id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a material.
///
/// Returns the owning lesson id so the caller can recompute the chain, or
/// None when the material does not exist.
pub async fn delete_material(pool: &SqlitePool, id: Uuid) -> Result<Option<Uuid>> {
    let Some(material) = get_material(pool, id).await? else {
        return Ok(None);
    };

    sqlx::query("DELETE FROM lesson_materials WHERE guid = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(Some(material.lesson_id))
}
