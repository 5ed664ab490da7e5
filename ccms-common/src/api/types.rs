//! Shared API request/response types
//!
//! Types exchanged between editing tools and the content engine. Leaf
//! estimate bounds live here so both sides validate against the same range.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lower bound for material/activity time estimates (minutes, inclusive)
pub const ESTIMATE_MIN_MINUTES: i64 = 1;

/// Upper bound for material/activity time estimates (minutes, inclusive)
pub const ESTIMATE_MAX_MINUTES: i64 = 480;

/// Aggregate levels of the containment tree, ordered leaf-to-root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateLevel {
    Lesson,
    Module,
    Course,
}

impl AggregateLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateLevel::Lesson => "lesson",
            AggregateLevel::Module => "module",
            AggregateLevel::Course => "course",
        }
    }
}

/// Material content kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialType {
    Pdf,
    Link,
    Document,
    Quiz,
    Exercise,
    Reading,
}

impl MaterialType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialType::Pdf => "pdf",
            MaterialType::Link => "link",
            MaterialType::Document => "document",
            MaterialType::Quiz => "quiz",
            MaterialType::Exercise => "exercise",
            MaterialType::Reading => "reading",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pdf" => Some(MaterialType::Pdf),
            "link" => Some(MaterialType::Link),
            "document" => Some(MaterialType::Document),
            "quiz" => Some(MaterialType::Quiz),
            "exercise" => Some(MaterialType::Exercise),
            "reading" => Some(MaterialType::Reading),
            _ => None,
        }
    }
}

/// Activity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Reflection,
    Exercise,
    Quiz,
    Discussion,
    AiChat,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Reflection => "reflection",
            ActivityType::Exercise => "exercise",
            ActivityType::Quiz => "quiz",
            ActivityType::Discussion => "discussion",
            ActivityType::AiChat => "ai_chat",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "reflection" => Some(ActivityType::Reflection),
            "exercise" => Some(ActivityType::Exercise),
            "quiz" => Some(ActivityType::Quiz),
            "discussion" => Some(ActivityType::Discussion),
            "ai_chat" => Some(ActivityType::AiChat),
            _ => None,
        }
    }
}

// ========================================
// Request Types
// ========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateModuleRequest {
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLessonRequest {
    pub title: String,
    /// Initial video length; omitted means no video yet
    pub video_seconds: Option<i64>,
}

/// Metadata-only module edit; never touches derived durations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateModuleRequest {
    pub title: Option<String>,
    pub order_index: Option<i64>,
}

/// Metadata-only lesson edit; never touches derived durations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLessonRequest {
    pub title: Option<String>,
    pub order_index: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetLessonVideoRequest {
    pub video_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMaterialRequest {
    pub title: String,
    pub material_type: MaterialType,
    /// Defaults to 10 minutes when omitted
    pub estimated_minutes: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMaterialRequest {
    pub title: Option<String>,
    pub material_type: Option<MaterialType>,
    pub estimated_minutes: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateActivityRequest {
    pub title: String,
    pub activity_type: ActivityType,
    /// Defaults to 5 minutes when omitted
    pub estimated_minutes: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateActivityRequest {
    pub title: Option<String>,
    pub activity_type: Option<ActivityType>,
    pub estimated_minutes: Option<i64>,
}

// ========================================
// Response Types
// ========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseResponse {
    pub course_id: Uuid,
    pub title: String,
    pub duration_total_minutes: i64,
    pub duration_display: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleResponse {
    pub module_id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub order_index: i64,
    pub duration_minutes: i64,
    pub duration_display: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonResponse {
    pub lesson_id: Uuid,
    pub module_id: Uuid,
    pub title: String,
    pub order_index: i64,
    pub video_seconds: i64,
    pub total_duration_minutes: i64,
    pub duration_display: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialResponse {
    pub material_id: Uuid,
    pub lesson_id: Uuid,
    pub title: String,
    pub material_type: MaterialType,
    pub order_index: i64,
    pub estimated_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityResponse {
    pub activity_id: Uuid,
    pub lesson_id: Uuid,
    pub title: String,
    pub activity_type: ActivityType,
    pub order_index: i64,
    pub estimated_minutes: i64,
}

// ========================================
// Bulk Recalculation Types
// ========================================

/// One entity the reconciler failed to settle; the entity keeps its prior
/// value and the caller re-runs the reconciler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecalcError {
    pub level: AggregateLevel,
    pub entity_id: Uuid,
    pub message: String,
}

/// Summary of one full-tree recalculation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecalcSummary {
    /// Entities whose stored derived value actually changed
    pub updated: u64,
    pub lessons_scanned: u64,
    pub modules_scanned: u64,
    pub courses_scanned: u64,
    pub errors: Vec<RecalcError>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

// ========================================
// Error Response Types
// ========================================

/// Error detail inside the standard error envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// Standard error body: `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}
