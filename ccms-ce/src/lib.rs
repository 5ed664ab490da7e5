//! ccms-ce library - Content Engine service
//!
//! Owns the course-content tree and its derived durations: the leaf estimate
//! store, the aggregation engine, and the HTTP API consumed by editing tools.

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod api;
pub mod db;
pub mod engine;

use engine::guard::AncestorGuard;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Per-ancestor-id recomputation serializer
    pub guard: Arc<AncestorGuard>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            guard: Arc::new(AncestorGuard::new()),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get, patch, post, put};

    Router::new()
        // Health endpoint
        .route("/health", get(api::health::health))
        // Course structure
        .route("/api/courses", post(api::courses::create_course))
        .route("/api/courses/:course_id", get(api::courses::get_course))
        .route("/api/courses/:course_id/modules", post(api::modules::create_module))
        .route("/api/courses/:course_id/modules", get(api::modules::list_modules))
        .route("/api/modules/:module_id", get(api::modules::get_module))
        .route("/api/modules/:module_id", patch(api::modules::update_module))
        .route("/api/modules/:module_id", delete(api::modules::delete_module))
        .route("/api/modules/:module_id/lessons", post(api::lessons::create_lesson))
        .route("/api/modules/:module_id/lessons", get(api::lessons::list_lessons))
        .route("/api/lessons/:lesson_id", get(api::lessons::get_lesson))
        .route("/api/lessons/:lesson_id", patch(api::lessons::update_lesson))
        .route("/api/lessons/:lesson_id", delete(api::lessons::delete_lesson))
        // Leaf estimate write API
        .route("/api/lessons/:lesson_id/video", put(api::lessons::set_lesson_video))
        .route("/api/lessons/:lesson_id/materials", post(api::materials::create_material))
        .route("/api/lessons/:lesson_id/materials", get(api::materials::list_materials))
        .route("/api/materials/:material_id", put(api::materials::update_material))
        .route("/api/materials/:material_id", delete(api::materials::delete_material))
        .route("/api/lessons/:lesson_id/activities", post(api::activities::create_activity))
        .route("/api/lessons/:lesson_id/activities", get(api::activities::list_activities))
        .route("/api/activities/:activity_id", put(api::activities::update_activity))
        .route("/api/activities/:activity_id", delete(api::activities::delete_activity))
        // Operator maintenance
        .route("/api/maintenance/recalculate", post(api::maintenance::recalculate_all))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
