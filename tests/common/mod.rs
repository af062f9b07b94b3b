//! Common test helpers for integration tests.
//!
//! The `#![allow(dead_code)]` attribute is necessary because Rust compiles each
//! integration test file as a separate crate.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use task_list::api::{AppConfig, AppState, router};
use task_list::infrastructure::{InMemoryTaskRepository, seed_if_empty};

// =============================================================================
// AppState Creation Helpers
// =============================================================================

/// Creates a test `AppState` over an empty in-memory store.
pub fn create_test_app_state() -> AppState {
    create_test_app_state_with_limit(AppConfig::default().max_task_entries)
}

/// Creates a test `AppState` allowing at most `max_task_entries` tasks.
pub fn create_test_app_state_with_limit(max_task_entries: usize) -> AppState {
    AppState::new(
        Arc::new(InMemoryTaskRepository::new()),
        AppConfig {
            max_task_entries,
            seed_data: false,
        },
    )
}

/// Creates a test `AppState` holding the four seed tasks (ids 1 to 4).
pub async fn create_seeded_app_state() -> AppState {
    let state = create_test_app_state();
    let inserted = seed_if_empty(
        state.task_repository.as_ref(),
        state.config.max_task_entries,
    )
    .await
    .expect("seeding an empty store succeeds");
    assert_eq!(inserted, 4);
    state
}

// =============================================================================
// Request Helpers
// =============================================================================

/// A response with its body collected.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parses the body as JSON.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }
}

/// Sends one request through a fresh router over `state`.
pub async fn send(state: &AppState, method: Method, uri: &str, body: Option<&str>) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(text) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(text.to_string())
        }
        None => Body::empty(),
    };
    let request = builder.body(body).expect("request is well formed");

    let response = router(state.clone())
        .oneshot(request)
        .await
        .expect("router is infallible");

    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = response
        .into_body()
        .collect()
        .await
        .expect("body can be collected")
        .to_bytes()
        .to_vec();

    TestResponse {
        status,
        location,
        body,
    }
}

/// Builds a create/update payload.
pub fn task_body(task_name: &str, is_completed: bool, due_date: &str) -> String {
    serde_json::json!({
        "taskName": task_name,
        "isCompleted": is_completed,
        "dueDate": due_date,
    })
    .to_string()
}
