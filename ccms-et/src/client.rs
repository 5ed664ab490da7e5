//! Typed HTTP client for the content engine
//!
//! Reads are wrapped in the bounded retry policy; writes are sent exactly
//! once (a leaf mutation is not idempotent, and the engine reports its own
//! validation/structural failures synchronously).

use std::time::Duration;

use ccms_common::api::types::{
    ActivityResponse, CourseResponse, CreateActivityRequest, CreateCourseRequest,
    CreateLessonRequest, CreateMaterialRequest, CreateModuleRequest, ErrorEnvelope,
    LessonResponse, MaterialResponse, ModuleResponse, RecalcSummary, SetLessonVideoRequest,
    UpdateActivityRequest, UpdateLessonRequest, UpdateMaterialRequest, UpdateModuleRequest,
};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ClientError;
use crate::retry::{retry_with_backoff, RetryPolicy};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the ccms-ce HTTP API
pub struct ContentClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl ContentClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
        })
    }

    /// Override the read retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Decode a response, mapping non-success statuses through the engine's
    /// error envelope
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ClientError::UnexpectedResponse(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        Err(api_error(status, body))
    }

    /// GET with retry on transient failure
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path);
        retry_with_backoff(path, &self.retry, || {
            let http = self.http.clone();
            let url = url.clone();
            async move {
                let response = http.get(&url).send().await?;
                Self::decode(response).await
            }
        })
        .await
    }

    /// Single-shot request with a JSON body
    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ClientError> {
        let response = self
            .http
            .request(method, self.url(path))
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Single-shot request with no body
    async fn send_empty(&self, method: Method, path: &str) -> Result<(), ClientError> {
        let response = self.http.request(method, self.url(path)).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(api_error(status, body))
    }

    // ========================================
    // Read API
    // ========================================

    pub async fn get_course(&self, course_id: Uuid) -> Result<CourseResponse, ClientError> {
        self.get_json(&format!("/api/courses/{}", course_id)).await
    }

    pub async fn get_module(&self, module_id: Uuid) -> Result<ModuleResponse, ClientError> {
        self.get_json(&format!("/api/modules/{}", module_id)).await
    }

    pub async fn get_lesson(&self, lesson_id: Uuid) -> Result<LessonResponse, ClientError> {
        self.get_json(&format!("/api/lessons/{}", lesson_id)).await
    }

    pub async fn list_modules(&self, course_id: Uuid) -> Result<Vec<ModuleResponse>, ClientError> {
        self.get_json(&format!("/api/courses/{}/modules", course_id)).await
    }

    pub async fn list_lessons(&self, module_id: Uuid) -> Result<Vec<LessonResponse>, ClientError> {
        self.get_json(&format!("/api/modules/{}/lessons", module_id)).await
    }

    pub async fn list_materials(
        &self,
        lesson_id: Uuid,
    ) -> Result<Vec<MaterialResponse>, ClientError> {
        self.get_json(&format!("/api/lessons/{}/materials", lesson_id)).await
    }

    pub async fn list_activities(
        &self,
        lesson_id: Uuid,
    ) -> Result<Vec<ActivityResponse>, ClientError> {
        self.get_json(&format!("/api/lessons/{}/activities", lesson_id)).await
    }

    // ========================================
    // Write API
    // ========================================

    pub async fn create_course(
        &self,
        request: &CreateCourseRequest,
    ) -> Result<CourseResponse, ClientError> {
        self.send_json(Method::POST, "/api/courses", request).await
    }

    pub async fn create_module(
        &self,
        course_id: Uuid,
        request: &CreateModuleRequest,
    ) -> Result<ModuleResponse, ClientError> {
        self.send_json(Method::POST, &format!("/api/courses/{}/modules", course_id), request)
            .await
    }

    pub async fn create_lesson(
        &self,
        module_id: Uuid,
        request: &CreateLessonRequest,
    ) -> Result<LessonResponse, ClientError> {
        self.send_json(Method::POST, &format!("/api/modules/{}/lessons", module_id), request)
            .await
    }

    pub async fn update_module(
        &self,
        module_id: Uuid,
        request: &UpdateModuleRequest,
    ) -> Result<ModuleResponse, ClientError> {
        self.send_json(Method::PATCH, &format!("/api/modules/{}", module_id), request)
            .await
    }

    pub async fn update_lesson(
        &self,
        lesson_id: Uuid,
        request: &UpdateLessonRequest,
    ) -> Result<LessonResponse, ClientError> {
        self.send_json(Method::PATCH, &format!("/api/lessons/{}", lesson_id), request)
            .await
    }

    pub async fn delete_module(&self, module_id: Uuid) -> Result<(), ClientError> {
        self.send_empty(Method::DELETE, &format!("/api/modules/{}", module_id)).await
    }

    pub async fn delete_lesson(&self, lesson_id: Uuid) -> Result<(), ClientError> {
        self.send_empty(Method::DELETE, &format!("/api/lessons/{}", lesson_id)).await
    }

    pub async fn set_lesson_video(
        &self,
        lesson_id: Uuid,
        request: &SetLessonVideoRequest,
    ) -> Result<LessonResponse, ClientError> {
        self.send_json(Method::PUT, &format!("/api/lessons/{}/video", lesson_id), request)
            .await
    }

    pub async fn create_material(
        &self,
        lesson_id: Uuid,
        request: &CreateMaterialRequest,
    ) -> Result<MaterialResponse, ClientError> {
        self.send_json(Method::POST, &format!("/api/lessons/{}/materials", lesson_id), request)
            .await
    }

    pub async fn update_material(
        &self,
        material_id: Uuid,
        request: &UpdateMaterialRequest,
    ) -> Result<MaterialResponse, ClientError> {
        self.send_json(Method::PUT, &format!("/api/materials/{}", material_id), request)
            .await
    }

    pub async fn delete_material(&self, material_id: Uuid) -> Result<(), ClientError> {
        self.send_empty(Method::DELETE, &format!("/api/materials/{}", material_id)).await
    }

    pub async fn create_activity(
        &self,
        lesson_id: Uuid,
        request: &CreateActivityRequest,
    ) -> Result<ActivityResponse, ClientError> {
        self.send_json(Method::POST, &format!("/api/lessons/{}/activities", lesson_id), request)
            .await
    }

    pub async fn update_activity(
        &self,
        activity_id: Uuid,
        request: &UpdateActivityRequest,
    ) -> Result<ActivityResponse, ClientError> {
        self.send_json(Method::PUT, &format!("/api/activities/{}", activity_id), request)
            .await
    }

    pub async fn delete_activity(&self, activity_id: Uuid) -> Result<(), ClientError> {
        self.send_empty(Method::DELETE, &format!("/api/activities/{}", activity_id)).await
    }

    // ========================================
    // Maintenance
    // ========================================

    pub async fn recalculate_all(&self) -> Result<RecalcSummary, ClientError> {
        let response = self
            .http
            .post(self.url("/api/maintenance/recalculate"))
            .send()
            .await?;
        Self::decode(response).await
    }
}

/// Map a non-success response body through the engine's error envelope,
/// falling back to the raw body when it is not an envelope
fn api_error(status: StatusCode, body: String) -> ClientError {
    match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => ClientError::Api {
            status: status.as_u16(),
            code: envelope.error.code,
            message: envelope.error.message,
        },
        Err(_) => ClientError::Api {
            status: status.as_u16(),
            code: "UNKNOWN".to_string(),
            message: body,
        },
    }
}
