//! Reconciler integration tests
//!
//! Drift is injected by writing derived columns directly, bypassing the
//! engine the way a historical bug or partial failure would have.

use ccms_ce::engine::guard::AncestorGuard;
use ccms_ce::engine::{mutations, reconciler};
use ccms_ce::db;
use ccms_common::api::types::{CreateLessonRequest, CreateMaterialRequest, MaterialType};
use ccms_common::db::init::init_database;
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

struct Tree {
    course_id: Uuid,
    module_id: Uuid,
    lesson_id: Uuid,
}

async fn setup() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("ccms.db")).await.unwrap();
    (dir, pool)
}

/// Course -> module -> lesson(630s video + 15min material) = 26 everywhere
async fn seed_tree(pool: &SqlitePool) -> Tree {
    let guard = AncestorGuard::new();

    let course = mutations::create_course(pool, "Course".to_string()).await.unwrap();
    let module = mutations::create_module(pool, course.guid, "Module".to_string()).await.unwrap();
    let lesson = mutations::create_lesson(
        pool,
        &guard,
        module.guid,
        CreateLessonRequest {
            title: "Lesson".to_string(),
            video_seconds: Some(630),
        },
    )
    .await
    .unwrap();
    mutations::create_material(
        pool,
        &guard,
        lesson.guid,
        CreateMaterialRequest {
            title: "Material".to_string(),
            material_type: MaterialType::Document,
            estimated_minutes: Some(15),
        },
    )
    .await
    .unwrap();

    Tree {
        course_id: course.guid,
        module_id: module.guid,
        lesson_id: lesson.guid,
    }
}

async fn corrupt(pool: &SqlitePool, sql: &str, id: Uuid) {
    sqlx::query(sql).bind(id.to_string()).execute(pool).await.unwrap();
}

#[tokio::test]
async fn test_repairs_injected_drift() {
    let (_dir, pool) = setup().await;
    let tree = seed_tree(&pool).await;

    corrupt(&pool, "UPDATE course_lessons SET total_duration_minutes = 999 WHERE guid = ?", tree.lesson_id).await;
    corrupt(&pool, "UPDATE course_modules SET duration_minutes = 0 WHERE guid = ?", tree.module_id).await;
    corrupt(&pool, "UPDATE courses SET duration_total_minutes = 7 WHERE guid = ?", tree.course_id).await;

    let summary = reconciler::recalculate_all(&pool).await.unwrap();

    assert_eq!(summary.updated, 3);
    assert!(summary.errors.is_empty());
    assert_eq!(summary.lessons_scanned, 1);
    assert_eq!(summary.modules_scanned, 1);
    assert_eq!(summary.courses_scanned, 1);

    let lesson = db::lessons::get_lesson(&pool, tree.lesson_id).await.unwrap().unwrap();
    let module = db::modules::get_module(&pool, tree.module_id).await.unwrap().unwrap();
    let course = db::courses::get_course(&pool, tree.course_id).await.unwrap().unwrap();
    assert_eq!(lesson.total_duration_minutes, 26);
    assert_eq!(module.duration_minutes, 26);
    assert_eq!(course.duration_total_minutes, 26);
}

#[tokio::test]
async fn test_module_reads_freshly_settled_lesson_totals() {
    let (_dir, pool) = setup().await;
    let tree = seed_tree(&pool).await;

    // Only the lesson drifts; the module must be recomputed from the
    // repaired lesson value within the same run, not the stale one
    corrupt(&pool, "UPDATE course_lessons SET total_duration_minutes = 999 WHERE guid = ?", tree.lesson_id).await;
    corrupt(&pool, "UPDATE course_modules SET duration_minutes = 999 WHERE guid = ?", tree.module_id).await;
    corrupt(&pool, "UPDATE courses SET duration_total_minutes = 999 WHERE guid = ?", tree.course_id).await;

    let summary = reconciler::recalculate_all(&pool).await.unwrap();
    assert_eq!(summary.updated, 3);

    let module = db::modules::get_module(&pool, tree.module_id).await.unwrap().unwrap();
    assert_eq!(module.duration_minutes, 26);
}

#[tokio::test]
async fn test_idempotent_second_run_updates_nothing() {
    let (_dir, pool) = setup().await;
    let tree = seed_tree(&pool).await;

    corrupt(&pool, "UPDATE courses SET duration_total_minutes = 500 WHERE guid = ?", tree.course_id).await;

    let first = reconciler::recalculate_all(&pool).await.unwrap();
    assert_eq!(first.updated, 1);

    let second = reconciler::recalculate_all(&pool).await.unwrap();
    assert_eq!(second.updated, 0, "second run with no mutations must be a no-op");
    assert!(second.errors.is_empty());
    assert_eq!(second.lessons_scanned, first.lessons_scanned);
}

#[tokio::test]
async fn test_empty_database() {
    let (_dir, pool) = setup().await;

    let summary = reconciler::recalculate_all(&pool).await.unwrap();
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.lessons_scanned, 0);
    assert_eq!(summary.modules_scanned, 0);
    assert_eq!(summary.courses_scanned, 0);
    assert!(summary.errors.is_empty());
    assert!(summary.finished_at >= summary.started_at);
}

#[tokio::test]
async fn test_lesson_without_leaves_settles_to_zero() {
    let (_dir, pool) = setup().await;
    let guard = AncestorGuard::new();

    let course = mutations::create_course(&pool, "Course".to_string()).await.unwrap();
    let module = mutations::create_module(&pool, course.guid, "Module".to_string()).await.unwrap();
    let lesson = mutations::create_lesson(
        &pool,
        &guard,
        module.guid,
        CreateLessonRequest { title: "Empty".to_string(), video_seconds: None },
    )
    .await
    .unwrap();

    corrupt(&pool, "UPDATE course_lessons SET total_duration_minutes = 40 WHERE guid = ?", lesson.guid).await;

    let summary = reconciler::recalculate_all(&pool).await.unwrap();
    assert_eq!(summary.updated, 1);

    let reread = db::lessons::get_lesson(&pool, lesson.guid).await.unwrap().unwrap();
    assert_eq!(reread.total_duration_minutes, 0);
}
