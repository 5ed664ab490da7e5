//! Shared HTTP API functionality
//!
//! Request/response types used by both the content-engine service (ccms-ce)
//! and the editing-tools client (ccms-et). Pure types only; each side wraps
//! them with its own framework plumbing (axum handlers, reqwest calls).

pub mod types;

pub use types::{
    ActivityResponse, ActivityType, AggregateLevel, CourseResponse, CreateActivityRequest,
    CreateCourseRequest, CreateLessonRequest, CreateMaterialRequest, CreateModuleRequest,
    ErrorDetail, ErrorEnvelope, LessonResponse, MaterialResponse, MaterialType, ModuleResponse,
    RecalcError, RecalcSummary, SetLessonVideoRequest, UpdateActivityRequest,
    UpdateLessonRequest, UpdateMaterialRequest, UpdateModuleRequest, ESTIMATE_MAX_MINUTES,
    ESTIMATE_MIN_MINUTES,
};
