//! Recompute scheduler
//!
//! Walks the ancestor chain of a mutated leaf strictly leaf-to-root,
//! recomputing each level from a fresh read of its children and stopping as
//! soon as a level's stored value is already correct. At most one write per
//! level per triggering mutation.

use ccms_common::api::types::AggregateLevel;
use ccms_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::{debug, trace};
use uuid::Uuid;

use super::aggregator::{self, LeafContribution};
use super::guard::AncestorGuard;
use super::persist;

/// Recompute the ancestor chain starting at the given ancestor.
///
/// `ancestor_id` is the immediate parent of the mutated leaf: the lesson for
/// a video/material/activity change, the module when a lesson was deleted,
/// the course when a module was deleted.
///
/// A failure partway leaves already-persisted lower levels in place and does
/// not propagate further; the reconciler repairs any resulting staleness.
pub async fn on_leaf_changed(
    db: &SqlitePool,
    guard: &AncestorGuard,
    ancestor_id: Uuid,
    level: AggregateLevel,
) -> Result<()> {
    let mut next = Some((ancestor_id, level));

    while let Some((id, level)) = next {
        next = recompute_step(db, guard, id, level).await?;
    }

    Ok(())
}

/// One recomputation step: read children fresh, aggregate, persist if the
/// value changed. Returns the next ancestor to recompute, or None when the
/// stored value was already correct or the course level was reached.
///
/// The whole read-compute-write sequence runs inside the per-ancestor
/// exclusive section so concurrent chains targeting the same ancestor cannot
/// interleave and lose an update.
async fn recompute_step(
    db: &SqlitePool,
    guard: &AncestorGuard,
    id: Uuid,
    level: AggregateLevel,
) -> Result<Option<(Uuid, AggregateLevel)>> {
    let _section = guard.acquire(id).await;

    match level {
        AggregateLevel::Lesson => {
            let inputs = persist::lesson_inputs(db, id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("lesson {}", id)))?;

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
                trace!(lesson = %id, total, "lesson total unchanged, chain stops");
                return Ok(None);
            }

            persist::write_lesson_total(db, id, total).await?;
            debug!(lesson = %id, old = inputs.stored_total, new = total, "lesson total recomputed");
            Ok(Some((inputs.module_id, AggregateLevel::Module)))
        }

        AggregateLevel::Module => {
            let inputs = persist::module_inputs(db, id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("module {}", id)))?;

            let totals = persist::lesson_totals(db, id).await?;
            let total = aggregator::module_total(&totals);
            if total == inputs.stored_total {
                trace!(module = %id, total, "module duration unchanged, chain stops");
                return Ok(None);
            }

            persist::write_module_duration(db, id, total).await?;
            debug!(module = %id, old = inputs.stored_total, new = total, "module duration recomputed");
            Ok(Some((inputs.course_id, AggregateLevel::Course)))
        }

        AggregateLevel::Course => {
            let stored = persist::course_stored_total(db, id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("course {}", id)))?;

            let durations = persist::module_durations(db, id).await?;
            let total = aggregator::course_total(&durations);
            if total != stored {
                persist::write_course_total(db, id, total).await?;
                debug!(course = %id, old = stored, new = total, "course total recomputed");
            }

            // Root; nothing above a course
            Ok(None)
        }
    }
}
