//! Data Transfer Objects for API requests and responses.
//!
//! Request payloads are not deserialized straight into a struct: a missing
//! or mistyped field would stop `serde` at the first problem. Instead
//! [`TaskInput::bind`] walks the generic JSON value field by field and
//! collects every failure.

use serde::Serialize;
use serde_json::{Map, Value};

use super::error::ErrorNumber;
use super::validation::{FieldFailure, ValidationFailures};
use crate::domain::{DueDate, MAX_TASK_NAME_LENGTH, Task, TaskDraft};

// =============================================================================
// Request: TaskInput
// =============================================================================

/// Prefix the binder puts in front of every field key.
const PAYLOAD_PREFIX: &str = "payload";

/// Key used for failures of the body as a whole.
const ROOT_KEY: &str = "$";

const NOT_A_STRING: &str = "The JSON value could not be converted to System.String.";
const NOT_A_BOOLEAN: &str = "The JSON value could not be converted to System.Boolean.";
const NOT_A_DATE: &str = "The JSON value could not be converted to System.DateTime.";
const NOT_AN_OBJECT: &str = "The JSON value could not be converted to TaskInput.";

fn field_key(field: &str) -> String {
    format!("{PAYLOAD_PREFIX}.{field}")
}

/// A structurally valid create/update payload.
///
/// Wire form:
///
/// ```json
/// { "taskName": "Buy groceries", "isCompleted": false, "dueDate": "2021-02-03T00:00:00Z" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInput {
    pub task_name: String,
    pub is_completed: bool,
    pub due_date: DueDate,
}

impl TaskInput {
    /// Binds a raw request body, checking every declared field.
    ///
    /// Fields are checked in declaration order (`taskName`, `isCompleted`,
    /// `dueDate`) and failures are keyed `payload.<FieldName>`. A body that
    /// is not a JSON object fails as a whole under `$`. Unknown properties
    /// are ignored; property names are matched case-sensitively.
    ///
    /// # Errors
    ///
    /// Returns the full `ValidationFailures` set if any field fails.
    pub fn bind(body: &[u8]) -> Result<Self, ValidationFailures> {
        let root: Value = serde_json::from_slice(body).map_err(|error| {
            ValidationFailures::single(ROOT_KEY, FieldFailure::raw(error.to_string()))
        })?;

        let Value::Object(fields) = root else {
            return Err(ValidationFailures::single(
                ROOT_KEY,
                FieldFailure::raw(NOT_AN_OBJECT),
            ));
        };

        let mut failures = ValidationFailures::new();
        let task_name = bind_task_name(&fields, &mut failures);
        let is_completed = bind_is_completed(&fields, &mut failures);
        let due_date = bind_due_date(&fields, &mut failures);

        match (task_name, is_completed, due_date) {
            (Some(task_name), Some(is_completed), Some(due_date)) if failures.is_empty() => {
                Ok(Self {
                    task_name,
                    is_completed,
                    due_date,
                })
            }
            _ => Err(failures),
        }
    }

    /// Converts the payload into the writable fields of a task.
    #[must_use]
    pub fn into_draft(self) -> TaskDraft {
        TaskDraft::new(self.task_name, self.is_completed, self.due_date)
    }
}

/// Looks a field up, treating JSON `null` as absent.
fn present<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    fields.get(name).filter(|value| !value.is_null())
}

fn required(failures: &mut ValidationFailures, field: &str) {
    failures.add(field_key(field), FieldFailure::coded(ErrorNumber::ParameterRequired));
}

fn bind_task_name(fields: &Map<String, Value>, failures: &mut ValidationFailures) -> Option<String> {
    const FIELD: &str = "TaskName";

    let Some(value) = present(fields, "taskName") else {
        required(failures, FIELD);
        return None;
    };
    let Some(text) = value.as_str() else {
        failures.add(field_key(FIELD), FieldFailure::raw(NOT_A_STRING));
        return None;
    };

    // Required rejects empty and whitespace-only strings too.
    if text.trim().is_empty() {
        required(failures, FIELD);
        return None;
    }
    if text.chars().count() > MAX_TASK_NAME_LENGTH {
        failures.add(
            field_key(FIELD),
            FieldFailure::coded(ErrorNumber::ParameterTooLarge),
        );
        return None;
    }
    Some(text.to_string())
}

fn bind_is_completed(fields: &Map<String, Value>, failures: &mut ValidationFailures) -> Option<bool> {
    const FIELD: &str = "IsCompleted";

    let Some(value) = present(fields, "isCompleted") else {
        required(failures, FIELD);
        return None;
    };
    let flag = value.as_bool();
    if flag.is_none() {
        failures.add(field_key(FIELD), FieldFailure::raw(NOT_A_BOOLEAN));
    }
    flag
}

fn bind_due_date(fields: &Map<String, Value>, failures: &mut ValidationFailures) -> Option<DueDate> {
    const FIELD: &str = "DueDate";

    let Some(value) = present(fields, "dueDate") else {
        required(failures, FIELD);
        return None;
    };
    let Some(text) = value.as_str() else {
        failures.add(field_key(FIELD), FieldFailure::raw(NOT_A_DATE));
        return None;
    };
    let due_date = DueDate::parse(text);
    if due_date.is_none() {
        failures.add(
            field_key(FIELD),
            FieldFailure::coded(ErrorNumber::ParameterInvalid),
        );
    }
    due_date
}

// =============================================================================
// Response: TaskResponse
// =============================================================================

/// Response DTO for a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: i32,
    pub task_name: String,
    pub is_completed: bool,
    pub due_date: DueDate,
}

impl From<&Task> for TaskResponse {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.value(),
            task_name: task.task_name.clone(),
            is_completed: task.is_completed,
            due_date: task.due_date,
        }
    }
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self::from(&task)
    }
}

// =============================================================================
// Tests
// =============================================================================
