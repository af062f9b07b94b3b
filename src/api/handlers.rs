//! HTTP handlers for the task list API.
//!
//! Request bodies arrive as raw bytes so that binding failures can be
//! translated against the exact JSON the client sent. Every handler turns
//! its outcome into either a success payload or a [`TaskError`], which
//! renders the status code and error records.

use std::env;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use bytes::Bytes;
use serde::Serialize;

use super::dto::{TaskInput, TaskResponse};
use super::error::TaskError;
use super::service::TaskService;
use super::validation::translate;
use crate::domain::{TaskDraft, TaskId};
use crate::infrastructure::{ConfigurationError, TaskRepository};

// =============================================================================
// Application Configuration
// =============================================================================

/// Default for `MAX_TASK_ENTRIES`.
pub const DEFAULT_MAX_TASK_ENTRIES: usize = 100;

/// Application configuration for runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Maximum number of tasks the store may hold.
    pub max_task_entries: usize,
    /// Whether to insert the seed tasks into an empty store at startup.
    pub seed_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_task_entries: DEFAULT_MAX_TASK_ENTRIES,
            seed_data: true,
        }
    }
}

impl AppConfig {
    /// Reads `MAX_TASK_ENTRIES` and `SEED_DATA` from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if either variable is set to an
    /// unusable value.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup.
    ///
    /// Unset or blank variables fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidNumber` if `MAX_TASK_ENTRIES` is
    /// not a positive integer, and `ConfigurationError::InvalidFlag` if
    /// `SEED_DATA` is not a recognised boolean.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let max_task_entries = match non_blank("MAX_TASK_ENTRIES") {
            Some(value) => match value.parse::<usize>() {
                Ok(limit) if limit > 0 => limit,
                _ => {
                    return Err(ConfigurationError::InvalidNumber {
                        name: "MAX_TASK_ENTRIES",
                        value,
                    });
                }
            },
            None => defaults.max_task_entries,
        };

        let seed_data = match non_blank("SEED_DATA") {
            Some(value) => match value.to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigurationError::InvalidFlag {
                        name: "SEED_DATA",
                        value,
                    });
                }
            },
            None => defaults.seed_data,
        };

        Ok(Self {
            max_task_entries,
            seed_data,
        })
    }
}

// =============================================================================
// Application State
// =============================================================================

/// Shared application dependencies.
#[derive(Clone)]
pub struct AppState {
    /// Task repository for persistence.
    pub task_repository: Arc<dyn TaskRepository>,
    /// Application configuration.
    pub config: AppConfig,
}

impl AppState {
    #[must_use]
    pub fn new(task_repository: Arc<dyn TaskRepository>, config: AppConfig) -> Self {
        Self {
            task_repository,
            config,
        }
    }

    fn service(&self) -> TaskService<'_> {
        TaskService::new(self.task_repository.as_ref(), self.config.max_task_entries)
    }
}

// =============================================================================
// Binding
// =============================================================================

/// Binds a request body, translating any failures into error records.
///
/// A body the translator cannot read back (malformed JSON, a non-object
/// root) ends up as an internal error.
fn bind_task_input(body: &Bytes) -> Result<TaskDraft, TaskError> {
    match TaskInput::bind(body) {
        Ok(input) => Ok(input.into_draft()),
        Err(failures) => {
            let responses = translate(body, &failures)?;
            Err(TaskError::Validation(responses))
        }
    }
}

// =============================================================================
// Task Handlers
// =============================================================================

/// `GET /tasks`: ids of every task.
///
/// # Errors
///
/// Returns `TaskError::Internal` if the store fails.
pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<i32>>, TaskError> {
    let ids = state.service().list_ids().await?;
    Ok(Json(ids.into_iter().map(TaskId::value).collect()))
}

/// `GET /tasks/{id}`
///
/// # Errors
///
/// Returns `TaskError::NotFound` if no task has this id.
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TaskResponse>, TaskError> {
    let task = state.service().get(TaskId::new(id)).await?;
    Ok(Json(TaskResponse::from(task)))
}

/// `POST /tasks`
///
/// Responds `201 Created` with a `Location: /tasks/{id}` header and the
/// created task.
///
/// # Errors
///
/// - 400 with one record per binding failure
/// - 403 when the store is full
/// - 409 when the name is taken
pub async fn create_task(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, TaskError> {
    let draft = bind_task_input(&body)?;
    let task = state.service().create(draft).await?;

    let location = format!("/tasks/{}", task.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(TaskResponse::from(task)),
    ))
}

/// `PATCH /tasks/{id}`: replaces every writable field.
///
/// # Errors
///
/// - 400 with one record per binding failure
/// - 409 when another task has the name
/// - 404 when no task has this id
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    body: Bytes,
) -> Result<StatusCode, TaskError> {
    let draft = bind_task_input(&body)?;
    state.service().update(TaskId::new(id), draft).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /tasks/{id}`
///
/// # Errors
///
/// Returns `TaskError::NotFound` if no task has this id.
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, TaskError> {
    state.service().delete(TaskId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// GET /health Handler
// =============================================================================

/// Response for the health check endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Health check endpoint.
///
/// ```json
/// { "status": "healthy", "version": "0.1.0" }
/// ```
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::{ErrorNumber, ErrorResponse};
    use crate::infrastructure::InMemoryTaskRepository;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let variables: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key| variables.get(key).cloned()
    }

    fn state_with_limit(max_task_entries: usize) -> AppState {
        AppState::new(
            Arc::new(InMemoryTaskRepository::new()),
            AppConfig {
                max_task_entries,
                seed_data: false,
            },
        )
    }

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_config_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.max_task_entries, 100);
        assert!(config.seed_data);
    }

    #[rstest]
    #[case("2", 2)]
    #[case(" 250 ", 250)]
    #[case("", 100)]
    fn test_config_max_task_entries(#[case] value: &str, #[case] expected: usize) {
        let config = AppConfig::from_lookup(lookup_from(&[("MAX_TASK_ENTRIES", value)])).unwrap();
        assert_eq!(config.max_task_entries, expected);
    }

    #[rstest]
    #[case("0")]
    #[case("-1")]
    #[case("many")]
    fn test_config_rejects_bad_max_task_entries(#[case] value: &str) {
        let result = AppConfig::from_lookup(lookup_from(&[("MAX_TASK_ENTRIES", value)]));
        assert_eq!(
            result,
            Err(ConfigurationError::InvalidNumber {
                name: "MAX_TASK_ENTRIES",
                value: value.to_string(),
            })
        );
    }

    #[rstest]
    #[case("false", false)]
    #[case("0", false)]
    #[case("TRUE", true)]
    #[case("yes", true)]
    fn test_config_seed_data(#[case] value: &str, #[case] expected: bool) {
        let config = AppConfig::from_lookup(lookup_from(&[("SEED_DATA", value)])).unwrap();
        assert_eq!(config.seed_data, expected);
    }

    #[rstest]
    fn test_config_rejects_bad_seed_flag() {
        let result = AppConfig::from_lookup(lookup_from(&[("SEED_DATA", "sometimes")]));
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidFlag { name: "SEED_DATA", .. })
        ));
    }

    // -------------------------------------------------------------------------
    // Binding
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_bind_task_input_translates_failures() {
        let body = Bytes::from_static(br#"{"taskName": "", "isCompleted": true}"#);

        let error = bind_task_input(&body).unwrap_err();

        assert_eq!(
            error,
            TaskError::Validation(vec![
                ErrorResponse::new(
                    ErrorNumber::ParameterRequired,
                    Some("taskName".to_string()),
                    Some(String::new()),
                ),
                ErrorResponse::new(
                    ErrorNumber::ParameterRequired,
                    Some("dueDate".to_string()),
                    None,
                ),
            ])
        );
    }

    #[rstest]
    #[case(b"{oops".as_slice())]
    #[case(b"42".as_slice())]
    fn test_bind_task_input_unreadable_body_is_internal(#[case] body: &[u8]) {
        let error = bind_task_input(&Bytes::copy_from_slice(body)).unwrap_err();
        assert!(matches!(error, TaskError::Internal(_)));
    }

    // -------------------------------------------------------------------------
    // Handlers
    // -------------------------------------------------------------------------

    #[rstest]
    #[tokio::test]
    async fn test_create_then_list_and_get() {
        let state = state_with_limit(100);
        let body = Bytes::from_static(
            br#"{"taskName": "Workout", "isCompleted": true, "dueDate": "2021-01-01"}"#,
        );

        let response = create_task(State(state.clone()), body)
            .await
            .unwrap()
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/tasks/1"
        );

        let Json(ids) = list_tasks(State(state.clone())).await.unwrap();
        assert_eq!(ids, vec![1]);

        let Json(task) = get_task(State(state), Path(1)).await.unwrap();
        assert_eq!(task.task_name, "Workout");
        assert!(task.is_completed);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_and_delete_return_no_content() {
        let state = state_with_limit(100);
        let body = Bytes::from_static(
            br#"{"taskName": "Mow Lawn", "isCompleted": false, "dueDate": "2021-06-11"}"#,
        );
        create_task(State(state.clone()), body.clone()).await.unwrap();

        let updated = update_task(State(state.clone()), Path(1), body).await;
        assert_eq!(updated, Ok(StatusCode::NO_CONTENT));

        let deleted = delete_task(State(state.clone()), Path(1)).await;
        assert_eq!(deleted, Ok(StatusCode::NO_CONTENT));

        let missing = get_task(State(state), Path(1)).await;
        assert_eq!(
            missing.map(|Json(task)| task),
            Err(TaskError::NotFound { id: TaskId::new(1) })
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_health_check() {
        let Json(response) = health_check().await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.version, env!("CARGO_PKG_VERSION"));
    }
}
