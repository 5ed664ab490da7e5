//! Database row models
//!
//! Authoritative leaf fields (`video_seconds`, `estimated_minutes`) are
//! written by the content-service write path; derived fields
//! (`total_duration_minutes`, `duration_minutes`, `duration_total_minutes`)
//! are written only by the aggregation engine.

use crate::api::types::{ActivityType, MaterialType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub guid: Uuid,
    pub title: String,
    /// Derived: sum of module durations
    pub duration_total_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseModule {
    pub guid: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub order_index: i64,
    /// Derived: sum of lesson totals
    pub duration_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub guid: Uuid,
    pub module_id: Uuid,
    pub title: String,
    pub order_index: i64,
    /// Authoritative leaf estimate
    pub video_seconds: i64,
    /// Derived: video minutes + material minutes + activity minutes
    pub total_duration_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub guid: Uuid,
    pub lesson_id: Uuid,
    pub title: String,
    pub material_type: MaterialType,
    pub order_index: i64,
    /// Authoritative leaf estimate
    pub estimated_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub guid: Uuid,
    pub lesson_id: Uuid,
    pub title: String,
    pub activity_type: ActivityType,
    pub order_index: i64,
    /// Authoritative leaf estimate
    pub estimated_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
}
