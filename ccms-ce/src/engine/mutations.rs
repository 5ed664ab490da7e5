//! Leaf mutation operations
//!
//! The write API surface of the engine: every create/update/delete of an
//! authoritative leaf estimate lands here, and every one of them triggers the
//! recompute scheduler on the mutated leaf's immediate parent before the
//! operation returns.
//!
//! Propagation policy: the leaf write succeeds or fails atomically; a failed
//! ancestor recomputation is logged and never surfaced as failure of the
//! user-facing mutation. Stale totals are repaired by the next successful
//! mutation under the same ancestor or by the reconciler.

use ccms_common::api::types::{
    AggregateLevel, CreateActivityRequest, CreateLessonRequest, CreateMaterialRequest,
    SetLessonVideoRequest, UpdateActivityRequest, UpdateMaterialRequest,
    ESTIMATE_MAX_MINUTES, ESTIMATE_MIN_MINUTES,
};
use ccms_common::db::models::{Activity, Course, CourseModule, Lesson, Material};
use ccms_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::error;
use uuid::Uuid;

use super::guard::AncestorGuard;
use super::scheduler;
use crate::db;

/// Default material estimate when the editor omits one (minutes)
const DEFAULT_MATERIAL_MINUTES: i64 = 10;

/// Default activity estimate when the editor omits one (minutes)
const DEFAULT_ACTIVITY_MINUTES: i64 = 5;

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::InvalidInput("title must not be blank".to_string()));
    }
    Ok(())
}

fn validate_estimate(minutes: i64) -> Result<()> {
    if !(ESTIMATE_MIN_MINUTES..=ESTIMATE_MAX_MINUTES).contains(&minutes) {
        return Err(Error::InvalidInput(format!(
            "estimated_minutes must be between {} and {}, got {}",
            ESTIMATE_MIN_MINUTES, ESTIMATE_MAX_MINUTES, minutes
        )));
    }
    Ok(())
}

fn validate_video_seconds(seconds: i64) -> Result<()> {
    if seconds < 0 {
        return Err(Error::InvalidInput(format!(
            "video_seconds must be non-negative, got {}",
            seconds
        )));
    }
    Ok(())
}

/// Run the recompute chain for a settled leaf mutation.
///
/// Recomputation failure must not fail the mutation that triggered it.
async fn trigger_recompute(
    pool: &SqlitePool,
    guard: &AncestorGuard,
    ancestor_id: Uuid,
    level: AggregateLevel,
) {
    if let Err(err) = scheduler::on_leaf_changed(pool, guard, ancestor_id, level).await {
        error!(
            ancestor = %ancestor_id,
            level = level.as_str(),
            error = %err,
            "recompute chain failed; totals stale until next mutation or recalculate"
        );
    }
}

// ========================================
// Structure Operations
// ========================================

pub async fn create_course(pool: &SqlitePool, title: String) -> Result<Course> {
    validate_title(&title)?;

    let course = db::courses::new_course(title);
    db::courses::insert_course(pool, &course).await?;
    Ok(course)
}

pub async fn create_module(pool: &SqlitePool, course_id: Uuid, title: String) -> Result<CourseModule> {
    validate_title(&title)?;

    if db::courses::get_course(pool, course_id).await?.is_none() {
        return Err(Error::NotFound(format!("course {}", course_id)));
    }

    let order_index = db::modules::next_order_index(pool, course_id).await?;
    let module = db::modules::new_module(course_id, title, order_index);
    db::modules::insert_module(pool, &module).await?;
    Ok(module)
}

pub async fn create_lesson(
    pool: &SqlitePool,
    guard: &AncestorGuard,
    module_id: Uuid,
    request: CreateLessonRequest,
) -> Result<Lesson> {
    validate_title(&request.title)?;
    let video_seconds = request.video_seconds.unwrap_or(0);
    validate_video_seconds(video_seconds)?;

    if db::modules::get_module(pool, module_id).await?.is_none() {
        return Err(Error::NotFound(format!("module {}", module_id)));
    }

    let order_index = db::lessons::next_order_index(pool, module_id).await?;
    let lesson = db::lessons::new_lesson(module_id, request.title, video_seconds, order_index);
    db::lessons::insert_lesson(pool, &lesson).await?;

    // A lesson created with video already contributes minutes
    if video_seconds > 0 {
        trigger_recompute(pool, guard, lesson.guid, AggregateLevel::Lesson).await;
    }

    db::lessons::get_lesson(pool, lesson.guid)
        .await?
        .ok_or_else(|| Error::Internal("lesson vanished after insert".to_string()))
}

pub async fn update_module_meta(
    pool: &SqlitePool,
    module_id: Uuid,
    title: Option<String>,
    order_index: Option<i64>,
) -> Result<CourseModule> {
    if let Some(title) = &title {
        validate_title(title)?;
    }

    let updated =
        db::modules::update_module_meta(pool, module_id, title.as_deref(), order_index).await?;
    if !updated {
        return Err(Error::NotFound(format!("module {}", module_id)));
    }

    db::modules::get_module(pool, module_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("module {}", module_id)))
}

pub async fn update_lesson_meta(
    pool: &SqlitePool,
    lesson_id: Uuid,
    title: Option<String>,
    order_index: Option<i64>,
) -> Result<Lesson> {
    if let Some(title) = &title {
        validate_title(title)?;
    }

    let updated =
        db::lessons::update_lesson_meta(pool, lesson_id, title.as_deref(), order_index).await?;
    if !updated {
        return Err(Error::NotFound(format!("lesson {}", lesson_id)));
    }

    db::lessons::get_lesson(pool, lesson_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("lesson {}", lesson_id)))
}

/// Delete a lesson and its whole subtree, then recompute the remaining chain
/// as if the subtree's contribution were removed
pub async fn delete_lesson(pool: &SqlitePool, guard: &AncestorGuard, lesson_id: Uuid) -> Result<()> {
    let Some(module_id) = db::lessons::delete_lesson(pool, lesson_id).await? else {
        return Err(Error::NotFound(format!("lesson {}", lesson_id)));
    };

    trigger_recompute(pool, guard, module_id, AggregateLevel::Module).await;
    Ok(())
}

/// Delete a module and its whole subtree, then recompute the course total
pub async fn delete_module(pool: &SqlitePool, guard: &AncestorGuard, module_id: Uuid) -> Result<()> {
    let Some(course_id) = db::modules::delete_module(pool, module_id).await? else {
        return Err(Error::NotFound(format!("module {}", module_id)));
    };

    trigger_recompute(pool, guard, course_id, AggregateLevel::Course).await;
    Ok(())
}

// ========================================
// Leaf Estimate Operations
// ========================================

/// Set a lesson's authoritative video length, then recompute its chain.
///
/// Returns the lesson re-read after recomputation, so the caller observes
/// the updated total in the same response.
pub async fn set_lesson_video(
    pool: &SqlitePool,
    guard: &AncestorGuard,
    lesson_id: Uuid,
    request: SetLessonVideoRequest,
) -> Result<Lesson> {
    validate_video_seconds(request.video_seconds)?;

    let updated = db::lessons::set_video_seconds(pool, lesson_id, request.video_seconds).await?;
    if !updated {
        return Err(Error::NotFound(format!("lesson {}", lesson_id)));
    }

    trigger_recompute(pool, guard, lesson_id, AggregateLevel::Lesson).await;

    db::lessons::get_lesson(pool, lesson_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("lesson {}", lesson_id)))
}

pub async fn create_material(
    pool: &SqlitePool,
    guard: &AncestorGuard,
    lesson_id: Uuid,
    request: CreateMaterialRequest,
) -> Result<Material> {
    validate_title(&request.title)?;
    let estimated_minutes = request.estimated_minutes.unwrap_or(DEFAULT_MATERIAL_MINUTES);
    validate_estimate(estimated_minutes)?;

    if db::lessons::get_lesson(pool, lesson_id).await?.is_none() {
        return Err(Error::NotFound(format!("lesson {}", lesson_id)));
    }

    let order_index = db::materials::next_order_index(pool, lesson_id).await?;
    let material = db::materials::new_material(
        lesson_id,
        request.title,
        request.material_type,
        estimated_minutes,
        order_index,
    );
    db::materials::insert_material(pool, &material).await?;

    trigger_recompute(pool, guard, lesson_id, AggregateLevel::Lesson).await;
    Ok(material)
}

pub async fn update_material(
    pool: &SqlitePool,
    guard: &AncestorGuard,
    material_id: Uuid,
    request: UpdateMaterialRequest,
) -> Result<Material> {
    if let Some(title) = &request.title {
        validate_title(title)?;
    }
    if let Some(minutes) = request.estimated_minutes {
        validate_estimate(minutes)?;
    }

    let updated = db::materials::update_material(
        pool,
        material_id,
        request.title.as_deref(),
        request.material_type,
        request.estimated_minutes,
    )
    .await?;
    if !updated {
        return Err(Error::NotFound(format!("material {}", material_id)));
    }

    let material = db::materials::get_material(pool, material_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("material {}", material_id)))?;

    trigger_recompute(pool, guard, material.lesson_id, AggregateLevel::Lesson).await;
    Ok(material)
}

pub async fn delete_material(
    pool: &SqlitePool,
    guard: &AncestorGuard,
    material_id: Uuid,
) -> Result<()> {
    let Some(lesson_id) = db::materials::delete_material(pool, material_id).await? else {
        return Err(Error::NotFound(format!("material {}", material_id)));
    };

    trigger_recompute(pool, guard, lesson_id, AggregateLevel::Lesson).await;
    Ok(())
}

pub async fn create_activity(
    pool: &SqlitePool,
    guard: &AncestorGuard,
    lesson_id: Uuid,
    request: CreateActivityRequest,
) -> Result<Activity> {
    validate_title(&request.title)?;
    let estimated_minutes = request.estimated_minutes.unwrap_or(DEFAULT_ACTIVITY_MINUTES);
    validate_estimate(estimated_minutes)?;

    if db::lessons::get_lesson(pool, lesson_id).await?.is_none() {
        return Err(Error::NotFound(format!("lesson {}", lesson_id)));
    }

    let order_index = db::activities::next_order_index(pool, lesson_id).await?;
    let activity = db::activities::new_activity(
        lesson_id,
        request.title,
        request.activity_type,
        estimated_minutes,
        order_index,
    );
    db::activities::insert_activity(pool, &activity).await?;

    trigger_recompute(pool, guard, lesson_id, AggregateLevel::Lesson).await;
    Ok(activity)
}

pub async fn update_activity(
    pool: &SqlitePool,
    guard: &AncestorGuard,
    activity_id: Uuid,
    request: UpdateActivityRequest,
) -> Result<Activity> {
    if let Some(title) = &request.title {
        validate_title(title)?;
    }
    if let Some(minutes) = request.estimated_minutes {
        validate_estimate(minutes)?;
    }

    let updated = db::activities::update_activity(
        pool,
        activity_id,
        request.title.as_deref(),
        request.activity_type,
        request.estimated_minutes,
    )
    .await?;
    if !updated {
        return Err(Error::NotFound(format!("activity {}", activity_id)));
    }

    let activity = db::activities::get_activity(pool, activity_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("activity {}", activity_id)))?;

    trigger_recompute(pool, guard, activity.lesson_id, AggregateLevel::Lesson).await;
    Ok(activity)
}

pub async fn delete_activity(
    pool: &SqlitePool,
    guard: &AncestorGuard,
    activity_id: Uuid,
) -> Result<()> {
    let Some(lesson_id) = db::activities::delete_activity(pool, activity_id).await? else {
        return Err(Error::NotFound(format!("activity {}", activity_id)));
    };

    trigger_recompute(pool, guard, lesson_id, AggregateLevel::Lesson).await;
    Ok(())
}
