//! Pure aggregation functions
//!
//! Derived values are always recomputed from the full set of current
//! children. Incremental deltas are rejected by design: any historical error
//! would be carried forward forever, while a full sum self-corrects on the
//! next recomputation.

use ccms_common::duration::video_minutes;

/// One leaf's contribution to a lesson total.
///
/// Closed set of leaf kinds with a uniform minutes extraction, so aggregation
/// never branches on leaf type at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafContribution {
    Video { seconds: i64 },
    Material { minutes: i64 },
    Activity { minutes: i64 },
}

impl LeafContribution {
    /// Minutes this leaf contributes to its lesson's total
    pub fn minutes(&self) -> i64 {
        match self {
            LeafContribution::Video { seconds } => video_minutes(*seconds),
            LeafContribution::Material { minutes } => *minutes,
            LeafContribution::Activity { minutes } => *minutes,
        }
    }
}

/// Total duration of a lesson from all of its leaves. Empty input yields 0.
pub fn lesson_total(leaves: &[LeafContribution]) -> i64 {
    leaves.iter().map(LeafContribution::minutes).sum()
}

/// Total duration of a module from its lessons' totals. Empty input yields 0.
pub fn module_total(lesson_totals: &[i64]) -> i64 {
    lesson_totals.iter().sum()
}

/// Total duration of a course from its modules' totals. Empty input yields 0.
pub fn course_total(module_totals: &[i64]) -> i64 {
    module_totals.iter().sum()
}
