//! Consistency reconciler
//!
//! Operator-triggered full-tree recomputation. Repairs any drift left behind
//! by partial recomputation failures: every lesson settles before any module
//! reads lesson totals, and every module settles before any course reads
//! module durations. Idempotent: a second run with no intervening leaf
//! mutation updates nothing.

use ccms_common::api::types::{AggregateLevel, RecalcError, RecalcSummary};
use ccms_common::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use super::aggregator::{self, LeafContribution};
use super::persist;

/// Recompute and persist every derived duration in the tree.
///
/// A per-entity failure is recorded and the entity skipped (keeping its prior
/// value) rather than aborting the run; the caller re-runs the reconciler to
/// settle skipped entities.
pub async fn recalculate_all(db: &SqlitePool) -> Result<RecalcSummary> {
    let started_at = Utc::now();
    let mut updated = 0u64;
    let mut errors = Vec::new();

    // Pass 1: lessons, from their leaves
    let lesson_ids = persist::all_lesson_ids(db).await?;
    for &id in &lesson_ids {
        settle(&mut updated, &mut errors, AggregateLevel::Lesson, id, settle_lesson(db, id).await);
    }

    // Pass 2: modules, from lesson totals persisted in pass 1
    let module_ids = persist::all_module_ids(db).await?;
    for &id in &module_ids {
        settle(&mut updated, &mut errors, AggregateLevel::Module, id, settle_module(db, id).await);
    }

    // Pass 3: courses, from module durations persisted in pass 2
    let course_ids = persist::all_course_ids(db).await?;
    for &id in &course_ids {
        settle(&mut updated, &mut errors, AggregateLevel::Course, id, settle_course(db, id).await);
    }

    let summary = RecalcSummary {
        updated,
        lessons_scanned: lesson_ids.len() as u64,
        modules_scanned: module_ids.len() as u64,
        courses_scanned: course_ids.len() as u64,
        errors,
        started_at,
        finished_at: Utc::now(),
    };

    info!(
        updated = summary.updated,
        lessons = summary.lessons_scanned,
        modules = summary.modules_scanned,
        courses = summary.courses_scanned,
        errors = summary.errors.len(),
        "full recalculation finished"
    );

    Ok(summary)
}

fn settle(
    updated: &mut u64,
    errors: &mut Vec<RecalcError>,
    level: AggregateLevel,
    id: Uuid,
    outcome: Result<bool>,
) {
    match outcome {
        Ok(true) => *updated += 1,
        Ok(false) => {}
        Err(err) => {
            warn!(level = level.as_str(), entity = %id, error = %err, "reconciler skipped entity");
            errors.push(RecalcError {
                level,
                entity_id: id,
                message: err.to_string(),
            });
        }
    }
}

/// Returns Ok(true) when the stored value changed. An entity deleted between
/// the id scan and the read settles as Ok(false); there is nothing to repair.
async fn settle_lesson(db: &SqlitePool, id: Uuid) -> Result<bool> {
    let Some(inputs) = persist::lesson_inputs(db, id).await? else {
        return Ok(false);
    };

    let mut leaves = vec![LeafContribution::Video {
        seconds: inputs.video_seconds,
    }];
    leaves.extend(
        persist::material_minutes(db, id)
            .await?
            .into_iter()
            .map(|minutes| LeafContribution::Material { minutes }),
    );
    leaves.extend(
        persist::activity_minutes(db, id)
            .await?
            .into_iter()
            .map(|minutes| LeafContribution::Activity { minutes }),
    );

    let total = aggregator::lesson_total(&leaves);
    if total == inputs.stored_total {
        return Ok(false);
    }

    persist::write_lesson_total(db, id, total).await?;
    Ok(true)
}

async fn settle_module(db: &SqlitePool, id: Uuid) -> Result<bool> {
    let Some(inputs) = persist::module_inputs(db, id).await? else {
        return Ok(false);
    };

    let total = aggregator::module_total(&persist::lesson_totals(db, id).await?);
    if total == inputs.stored_total {
        return Ok(false);
    }

    persist::write_module_duration(db, id, total).await?;
    Ok(true)
}

async fn settle_course(db: &SqlitePool, id: Uuid) -> Result<bool> {
    let Some(stored) = persist::course_stored_total(db, id).await? else {
        return Ok(false);
    };

    let total = aggregator::course_total(&persist::module_durations(db, id).await?);
    if total == stored {
        return Ok(false);
    }

    persist::write_course_total(db, id, total).await?;
    Ok(true)
}
