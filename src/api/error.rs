//! API error handling.
//!
//! A failed validation answers with a JSON array of [`ErrorResponse`]
//! records, one per failure. A business-rule rejection (403, 404, 409)
//! answers with a single record, and an internal error with no body. [`TaskError`] is the single outcome type the
//! handlers return; it is mapped to a status code and body in one place,
//! its `IntoResponse` impl.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{RuleViolation, TaskId};
use crate::infrastructure::RepositoryError;

use super::validation::TranslateError;

// =============================================================================
// Error Numbers
// =============================================================================

/// `errorNumber` reported for a failure whose encoded description is not a
/// known code.
pub const RAW_ERROR_NUMBER: i32 = 0;

/// The fixed set of error codes clients can match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorNumber {
    EntityExists = 1,
    ParameterTooLarge = 2,
    ParameterRequired = 3,
    EntityLimitReached = 4,
    EntityNotFound = 5,
    ParameterTooSmall = 6,
    ParameterInvalid = 7,
}

impl ErrorNumber {
    /// All codes in numeric order.
    pub const ALL: [Self; 7] = [
        Self::EntityExists,
        Self::ParameterTooLarge,
        Self::ParameterRequired,
        Self::EntityLimitReached,
        Self::EntityNotFound,
        Self::ParameterTooSmall,
        Self::ParameterInvalid,
    ];

    /// Numeric wire value.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Looks a code up by its numeric value.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|number| number.code() == code)
    }

    /// The encoded form a validator attaches to a field failure.
    #[must_use]
    pub const fn encoded(self) -> &'static str {
        match self {
            Self::EntityExists => "1",
            Self::ParameterTooLarge => "2",
            Self::ParameterRequired => "3",
            Self::EntityLimitReached => "4",
            Self::EntityNotFound => "5",
            Self::ParameterTooSmall => "6",
            Self::ParameterInvalid => "7",
        }
    }

    /// Human-readable description sent as `errorDescription`.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::EntityExists => "The entity already exists",
            Self::ParameterTooLarge => "The parameter value is too large",
            Self::ParameterRequired => "The parameter is required",
            Self::EntityLimitReached => {
                "The maximum number of entities have been created. No further entities can be created at this time."
            }
            Self::EntityNotFound => "The entity could not be found",
            Self::ParameterTooSmall => "The parameter value is too small",
            Self::ParameterInvalid => "The parameter value is not valid",
        }
    }
}

/// Decodes a failure's encoded description into `(errorDescription, errorNumber)`.
///
/// A known code yields its fixed description. Anything else, free text or
/// an unknown number, is passed through verbatim with [`RAW_ERROR_NUMBER`].
#[must_use]
pub fn decode_error_message(encoded: &str) -> (String, i32) {
    encoded
        .trim()
        .parse::<i32>()
        .ok()
        .and_then(ErrorNumber::from_code)
        .map_or_else(
            || (encoded.to_string(), RAW_ERROR_NUMBER),
            |number| (number.description().to_string(), number.code()),
        )
}

// =============================================================================
// Error Response
// =============================================================================

/// One detected problem, as sent to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_number: i32,
    pub parameter_name: Option<String>,
    pub parameter_value: Option<String>,
    pub error_description: String,
}

impl ErrorResponse {
    /// Builds a record for a known error code.
    #[must_use]
    pub fn new(
        number: ErrorNumber,
        parameter_name: Option<String>,
        parameter_value: Option<String>,
    ) -> Self {
        Self {
            error_number: number.code(),
            parameter_name,
            parameter_value,
            error_description: number.description().to_string(),
        }
    }

    /// Builds a record from an encoded failure description.
    #[must_use]
    pub fn from_encoded(
        encoded: &str,
        parameter_name: Option<String>,
        parameter_value: Option<String>,
    ) -> Self {
        let (error_description, error_number) = decode_error_message(encoded);
        Self {
            error_number,
            parameter_name,
            parameter_value,
            error_description,
        }
    }
}

// =============================================================================
// Task Error
// =============================================================================

/// Every way a task request can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The payload failed structural validation. HTTP 400.
    #[error("payload failed validation with {} error(s)", .0.len())]
    Validation(Vec<ErrorResponse>),

    /// The task limit has been reached. HTTP 403.
    #[error("task limit of {limit} reached")]
    CapacityExceeded { limit: usize },

    /// Another task already uses the name. HTTP 409.
    #[error("a task named {task_name:?} already exists")]
    Conflict { task_name: String },

    /// The addressed task does not exist. HTTP 404.
    #[error("task {id} not found")]
    NotFound { id: TaskId },

    /// Anything unanticipated. HTTP 500, no body.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TaskError {
    /// HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::CapacityExceeded { .. } => StatusCode::FORBIDDEN,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The record sent for a business-rule rejection.
    ///
    /// `None` for validation failures, which answer with a list, and for
    /// internal errors, which answer without a body.
    #[must_use]
    pub fn error_response(&self) -> Option<ErrorResponse> {
        match self {
            Self::CapacityExceeded { .. } => Some(ErrorResponse::new(
                ErrorNumber::EntityLimitReached,
                None,
                None,
            )),
            Self::Conflict { task_name } => Some(ErrorResponse::new(
                ErrorNumber::EntityExists,
                Some("taskName".to_string()),
                Some(task_name.clone()),
            )),
            Self::NotFound { id } => Some(ErrorResponse::new(
                ErrorNumber::EntityNotFound,
                Some("id".to_string()),
                Some(id.to_string()),
            )),
            Self::Validation(_) | Self::Internal(_) => None,
        }
    }
}

impl IntoResponse for TaskError {
    fn into_response(self) -> Response {
        match &self {
            Self::NotFound { id } => tracing::info!(%id, "Task was not found"),
            Self::Internal(message) => tracing::error!(error = %message, "Request caused an internal error"),
            other => tracing::debug!(error = %other, "Request rejected"),
        }

        let status = self.status_code();
        if let Self::Validation(responses) = self {
            return (status, Json(responses)).into_response();
        }
        match self.error_response() {
            Some(body) => (status, Json(body)).into_response(),
            None => status.into_response(),
        }
    }
}

impl From<RuleViolation> for TaskError {
    fn from(violation: RuleViolation) -> Self {
        match violation {
            RuleViolation::CapacityExceeded { limit } => Self::CapacityExceeded { limit },
            RuleViolation::NameTaken { task_name } => Self::Conflict { task_name },
            RuleViolation::NotFound { id } => Self::NotFound { id },
        }
    }
}

impl From<RepositoryError> for TaskError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Duplicate(task_name) => Self::Conflict { task_name },
            RepositoryError::DatabaseError(_) | RepositoryError::CorruptRow(_) => {
                Self::Internal(error.to_string())
            }
        }
    }
}

impl From<TranslateError> for TaskError {
    fn from(error: TranslateError) -> Self {
        Self::Internal(error.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", 1, "The entity already exists")]
    #[case("2", 2, "The parameter value is too large")]
    #[case("3", 3, "The parameter is required")]
    #[case("5", 5, "The entity could not be found")]
    #[case("6", 6, "The parameter value is too small")]
    #[case("7", 7, "The parameter value is not valid")]
    fn test_decode_known_codes(
        #[case] encoded: &str,
        #[case] number: i32,
        #[case] description: &str,
    ) {
        assert_eq!(
            decode_error_message(encoded),
            (description.to_string(), number)
        );
    }

    #[rstest]
    #[case("0")]
    #[case("8")]
    #[case("-1")]
    #[case("The JSON value could not be converted to System.Boolean.")]
    #[case("")]
    fn test_decode_unknown_is_raw(#[case] encoded: &str) {
        assert_eq!(
            decode_error_message(encoded),
            (encoded.to_string(), RAW_ERROR_NUMBER)
        );
    }

    #[rstest]
    fn test_encoded_round_trips_through_decode() {
        for number in ErrorNumber::ALL {
            let (description, code) = decode_error_message(number.encoded());
            assert_eq!(code, number.code());
            assert_eq!(description, number.description());
        }
    }

    #[rstest]
    fn test_error_response_serializes_camel_case_with_nulls() {
        let response = ErrorResponse::new(ErrorNumber::EntityLimitReached, None, None);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["errorNumber"], 4);
        assert!(json["parameterName"].is_null());
        assert!(json["parameterValue"].is_null());
        assert_eq!(
            json["errorDescription"],
            ErrorNumber::EntityLimitReached.description()
        );
    }

    #[rstest]
    #[case(TaskError::Validation(vec![]), StatusCode::BAD_REQUEST)]
    #[case(TaskError::CapacityExceeded { limit: 1 }, StatusCode::FORBIDDEN)]
    #[case(TaskError::Conflict { task_name: "a".into() }, StatusCode::CONFLICT)]
    #[case(TaskError::NotFound { id: TaskId::new(1) }, StatusCode::NOT_FOUND)]
    #[case(TaskError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_status_code_mapping(#[case] error: TaskError, #[case] expected: StatusCode) {
        assert_eq!(error.status_code(), expected);
    }

    #[rstest]
    fn test_not_found_body() {
        let body = TaskError::NotFound { id: TaskId::new(12) }
            .error_response()
            .unwrap();

        assert_eq!(
            body,
            ErrorResponse::new(
                ErrorNumber::EntityNotFound,
                Some("id".to_string()),
                Some("12".to_string()),
            )
        );
    }

    #[rstest]
    fn test_conflict_body() {
        let body = TaskError::Conflict {
            task_name: "Buy groceries".to_string(),
        }
        .error_response()
        .unwrap();

        assert_eq!(body.error_number, 1);
        assert_eq!(body.parameter_name.as_deref(), Some("taskName"));
        assert_eq!(body.parameter_value.as_deref(), Some("Buy groceries"));
    }

    #[rstest]
    #[case(TaskError::Validation(vec![]))]
    #[case(TaskError::Internal("boom".into()))]
    fn test_no_single_record(#[case] error: TaskError) {
        assert!(error.error_response().is_none());
    }

    async fn body_json(error: TaskError) -> serde_json::Value {
        use http_body_util::BodyExt;

        let bytes = error
            .into_response()
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[rstest]
    #[case(TaskError::CapacityExceeded { limit: 2 }, 4)]
    #[case(TaskError::Conflict { task_name: "Workout".into() }, 1)]
    #[case(TaskError::NotFound { id: TaskId::new(7) }, 5)]
    #[tokio::test]
    async fn test_rule_rejections_render_a_single_object(
        #[case] error: TaskError,
        #[case] number: i32,
    ) {
        let json = body_json(error).await;

        assert!(json.is_object());
        assert_eq!(json["errorNumber"], number);
    }

    #[rstest]
    #[tokio::test]
    async fn test_validation_renders_a_list() {
        let record = ErrorResponse::new(ErrorNumber::ParameterRequired, Some("taskName".into()), None);

        let json = body_json(TaskError::Validation(vec![record.clone()])).await;

        assert_eq!(json, serde_json::json!([record]));
    }

    #[rstest]
    #[tokio::test]
    async fn test_internal_renders_an_empty_body() {
        use http_body_util::BodyExt;

        let response = TaskError::Internal("boom".into()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }

    #[rstest]
    fn test_repository_error_conversion() {
        assert_eq!(
            TaskError::from(RepositoryError::Duplicate("Workout".into())),
            TaskError::Conflict {
                task_name: "Workout".into()
            }
        );
        assert!(matches!(
            TaskError::from(RepositoryError::DatabaseError("down".into())),
            TaskError::Internal(_)
        ));
    }

    proptest! {
        #[test]
        fn prop_decode_never_loses_unknown_text(text in "[^0-9]*") {
            let (description, number) = decode_error_message(&text);
            prop_assert_eq!(number, RAW_ERROR_NUMBER);
            prop_assert_eq!(description, text);
        }

        #[test]
        fn prop_decode_code_is_known_or_raw(code in any::<i32>()) {
            let (_, number) = decode_error_message(&code.to_string());
            if (1..=7).contains(&code) {
                prop_assert_eq!(number, code);
            } else {
                prop_assert_eq!(number, RAW_ERROR_NUMBER);
            }
        }
    }
}
