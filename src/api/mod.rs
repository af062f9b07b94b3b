//! API module for HTTP handlers.
//!
//! This module contains route definitions, request binding, error
//! translation and the business-rule service the handlers call.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod service;
pub mod validation;

use axum::Router;
use axum::routing::get;

pub use dto::{TaskInput, TaskResponse};
pub use error::{ErrorNumber, ErrorResponse, TaskError};
pub use handlers::{
    AppConfig, AppState, HealthResponse, create_task, delete_task, get_task, health_check,
    list_tasks, update_task,
};
pub use service::TaskService;
pub use validation::{FieldFailure, TranslateError, ValidationFailures, translate};

/// Builds the application router.
///
/// Middleware layers are left to the caller.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).patch(update_task).delete(delete_task),
        )
        .with_state(state)
}
