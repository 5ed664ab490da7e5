//! Client integration tests
//!
//! Runs the editing-tools client against an in-process stub of the content
//! engine API, with injectable failures and call counting, to exercise the
//! retry policy, request deduplication, and optimistic-update reconciliation.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use ccms_et::{ContentClient, EditorCache, RetryPolicy};

#[derive(Clone)]
struct StubState {
    /// Number of list requests received
    list_calls: Arc<AtomicU32>,
    /// Remaining list requests to fail with 500 before succeeding
    failures_left: Arc<AtomicU32>,
    /// Artificial latency on list responses
    list_delay_ms: u64,
}

impl StubState {
    fn new(failures: u32, list_delay_ms: u64) -> Self {
        Self {
            list_calls: Arc::new(AtomicU32::new(0)),
            failures_left: Arc::new(AtomicU32::new(failures)),
            list_delay_ms,
        }
    }
}

fn material_json(lesson_id: Uuid, title: &str, minutes: i64, order_index: i64) -> serde_json::Value {
    json!({
        "material_id": Uuid::new_v4(),
        "lesson_id": lesson_id,
        "title": title,
        "material_type": "pdf",
        "order_index": order_index,
        "estimated_minutes": minutes,
    })
}

async fn list_materials(
    State(state): State<StubState>,
    Path(lesson_id): Path<Uuid>,
) -> impl IntoResponse {
    state.list_calls.fetch_add(1, Ordering::SeqCst);

    if state.list_delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(state.list_delay_ms)).await;
    }

    let failures = &state.failures_left;
    if failures
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
    {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": {"code": "INTERNAL_ERROR", "message": "injected"}})),
        );
    }

    (
        StatusCode::OK,
        Json(json!([
            material_json(lesson_id, "Slides", 15, 0),
            material_json(lesson_id, "Worksheet", 10, 1),
        ])),
    )
}

async fn missing_lesson_materials(Path(lesson_id): Path<Uuid>) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": {"code": "NOT_FOUND", "message": format!("lesson {}", lesson_id)}})),
    )
}

async fn create_material(
    Path(lesson_id): Path<Uuid>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let minutes = body["estimated_minutes"].as_i64().unwrap_or(10);
    let title = body["title"].as_str().unwrap_or("untitled");
    (StatusCode::OK, Json(material_json(lesson_id, title, minutes, 2)))
}

/// Bind the stub on an ephemeral port and return its base URL
async fn start_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 5,
        initial_backoff_ms: 1,
        max_backoff_ms: 8,
    }
}

#[tokio::test]
async fn test_read_retries_transient_then_succeeds() {
    let state = StubState::new(2, 0);
    let router = Router::new()
        .route("/api/lessons/:lesson_id/materials", get(list_materials))
        .with_state(state.clone());
    let base_url = start_stub(router).await;

    let client = ContentClient::new(base_url).unwrap().with_retry_policy(fast_retry());
    let materials = client.list_materials(Uuid::new_v4()).await.unwrap();

    assert_eq!(materials.len(), 2);
    assert_eq!(state.list_calls.load(Ordering::SeqCst), 3, "two failures + one success");
}

#[tokio::test]
async fn test_read_gives_up_after_bounded_attempts() {
    // More injected failures than the policy allows attempts
    let state = StubState::new(100, 0);
    let router = Router::new()
        .route("/api/lessons/:lesson_id/materials", get(list_materials))
        .with_state(state.clone());
    let base_url = start_stub(router).await;

    let client = ContentClient::new(base_url).unwrap().with_retry_policy(fast_retry());
    let result = client.list_materials(Uuid::new_v4()).await;

    assert!(result.is_err());
    assert_eq!(state.list_calls.load(Ordering::SeqCst), 5, "must stop at max_attempts");
}

#[tokio::test]
async fn test_permanent_error_surfaces_without_retry() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let router = Router::new().route(
        "/api/lessons/:lesson_id/materials",
        get(move |path: Path<Uuid>| {
            counter.fetch_add(1, Ordering::SeqCst);
            missing_lesson_materials(path)
        }),
    );
    let base_url = start_stub(router).await;

    let client = ContentClient::new(base_url).unwrap().with_retry_policy(fast_retry());
    let result = client.list_materials(Uuid::new_v4()).await;

    match result {
        Err(ccms_et::ClientError::Api { status, code, .. }) => {
            assert_eq!(status, 404);
            assert_eq!(code, "NOT_FOUND");
        }
        other => panic!("expected 404 Api error, got {:?}", other.map(|v| v.len())),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1, "structural errors must not retry");
}

#[tokio::test]
async fn test_concurrent_cached_reads_share_one_fetch() {
    let state = StubState::new(0, 50);
    let router = Router::new()
        .route("/api/lessons/:lesson_id/materials", get(list_materials))
        .with_state(state.clone());
    let base_url = start_stub(router).await;

    let client = ContentClient::new(base_url).unwrap().with_retry_policy(fast_retry());
    let cache = Arc::new(EditorCache::new(client));
    let lesson_id = Uuid::new_v4();

    let mut handles = Vec::new();
    for _ in 0..6 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move { cache.materials_of(lesson_id).await.unwrap() }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().len(), 2);
    }

    assert_eq!(
        state.list_calls.load(Ordering::SeqCst),
        1,
        "concurrent readers must share the in-flight fetch"
    );
}

#[tokio::test]
async fn test_sequential_reads_hit_cache() {
    let state = StubState::new(0, 0);
    let router = Router::new()
        .route("/api/lessons/:lesson_id/materials", get(list_materials))
        .with_state(state.clone());
    let base_url = start_stub(router).await;

    let client = ContentClient::new(base_url).unwrap().with_retry_policy(fast_retry());
    let cache = EditorCache::new(client);
    let lesson_id = Uuid::new_v4();

    cache.materials_of(lesson_id).await.unwrap();
    cache.materials_of(lesson_id).await.unwrap();
    cache.materials_of(lesson_id).await.unwrap();

    assert_eq!(state.list_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_mutation_triggers_authoritative_refetch() {
    let state = StubState::new(0, 0);
    let router = Router::new()
        .route("/api/lessons/:lesson_id/materials", get(list_materials))
        .route("/api/lessons/:lesson_id/materials", post(create_material))
        .with_state(state.clone());
    let base_url = start_stub(router).await;

    let client = ContentClient::new(base_url).unwrap().with_retry_policy(fast_retry());
    let cache = EditorCache::new(client);
    let lesson_id = Uuid::new_v4();

    // Prime the cache, then mutate
    cache.materials_of(lesson_id).await.unwrap();
    let created = cache
        .create_material(
            lesson_id,
            &ccms_common::api::types::CreateMaterialRequest {
                title: "New doc".to_string(),
                material_type: ccms_common::api::types::MaterialType::Pdf,
                estimated_minutes: Some(25),
            },
        )
        .await
        .unwrap();
    assert_eq!(created.estimated_minutes, 25);

    // One priming fetch plus one reconciling re-fetch
    assert_eq!(state.list_calls.load(Ordering::SeqCst), 2);

    // The cached value is the server's authoritative list, not the
    // optimistic one (stub returns its canonical two materials)
    let cached = cache.materials_of(lesson_id).await.unwrap();
    assert_eq!(cached.len(), 2);
    assert_eq!(state.list_calls.load(Ordering::SeqCst), 2, "read after refetch must hit cache");
}
