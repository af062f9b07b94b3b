//! Structural validation failures and their translation into error records.
//!
//! Validation runs in two passes over the same buffered request body:
//!
//! 1. A binder (see [`TaskInput::bind`](super::dto::TaskInput::bind)) checks
//!    shape, type and presence of each field and records a
//!    [`ValidationFailures`] set keyed by internal field names. It keeps no
//!    values.
//! 2. [`translate`] re-parses the raw body as generic JSON and, for each
//!    failure, recovers what the client actually sent under the field's
//!    external (wire) name.
//!
//! The translator does not recover from a body it cannot read as a JSON
//! object; that is reported as a [`TranslateError`] and ends the request as
//! an internal error.

use serde_json::{Map, Value};
use thiserror::Error;

use super::error::{ErrorNumber, ErrorResponse};

// =============================================================================
// Validation Failures
// =============================================================================

/// A single failed constraint on a field.
///
/// The description is encoded: either a numeric [`ErrorNumber`] as text, or
/// free text produced by the binder for failures that have no code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    message: String,
}

impl FieldFailure {
    /// A failure carrying a known error code.
    #[must_use]
    pub fn coded(number: ErrorNumber) -> Self {
        Self {
            message: number.encoded().to_string(),
        }
    }

    /// A failure carrying free text.
    #[must_use]
    pub fn raw(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The encoded description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Field-keyed validation failures in the order they were recorded.
///
/// Keys are internal names (`payload.TaskName`, `$.dueDate`, `$`); several
/// failures may share a key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationFailures {
    entries: Vec<(String, Vec<FieldFailure>)>,
}

impl ValidationFailures {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Creates a set holding a single failure.
    #[must_use]
    pub fn single(key: impl Into<String>, failure: FieldFailure) -> Self {
        let mut failures = Self::new();
        failures.add(key, failure);
        failures
    }

    /// Records a failure under `key`, after any failures already recorded for it.
    pub fn add(&mut self, key: impl Into<String>, failure: FieldFailure) {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, failures)) => failures.push(failure),
            None => self.entries.push((key, vec![failure])),
        }
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of individual failures across all keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, failures)| failures.len()).sum()
    }

    /// Iterates keys with their failures, in recording order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FieldFailure])> {
        self.entries
            .iter()
            .map(|(key, failures)| (key.as_str(), failures.as_slice()))
    }
}

// =============================================================================
// Key Derivation
// =============================================================================

/// Strips the prefix nested-model binding adds to a key.
///
/// Everything up to and including the last `.` is dropped, so
/// `payload.TaskName` and `$.taskName` both become the bare field name.
#[must_use]
pub fn cleanse_key(key: &str) -> &str {
    key.rsplit('.').next().unwrap_or(key)
}

/// Converts a field name to lower camel case by lowering its first character.
#[must_use]
pub fn to_camel_case(name: &str) -> String {
    let mut characters = name.chars();
    characters.next().map_or_else(String::new, |first| {
        first.to_lowercase().chain(characters).collect()
    })
}

/// Derives the wire name a client used for an internal key.
#[must_use]
pub fn external_name(key: &str) -> String {
    to_camel_case(cleanse_key(key))
}

// =============================================================================
// Translator
// =============================================================================

/// The translator could not read the raw body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    /// The body is not valid JSON.
    #[error("request body is not valid JSON: {0}")]
    MalformedBody(String),

    /// The body is valid JSON but not an object.
    #[error("request body is not a JSON object")]
    NotAnObject,
}

/// Text sent as `parameterValue` for a submitted JSON value.
///
/// Strings are sent without quotes, other values as their JSON text. A
/// `null` counts as nothing submitted.
fn parameter_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn parse_object(raw_body: &[u8]) -> Result<Map<String, Value>, TranslateError> {
    match serde_json::from_slice(raw_body) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(TranslateError::NotAnObject),
        Err(error) => Err(TranslateError::MalformedBody(error.to_string())),
    }
}

/// Translates validation failures into one `ErrorResponse` per failure.
///
/// Records come out in the iteration order of `failures`. A property the
/// client omitted (or sent as `null`) is reported with
/// `parameterValue: null`.
///
/// # Errors
///
/// Returns `TranslateError` if `raw_body` is not a JSON object.
pub fn translate(
    raw_body: &[u8],
    failures: &ValidationFailures,
) -> Result<Vec<ErrorResponse>, TranslateError> {
    let body = parse_object(raw_body)?;
    let mut responses = Vec::with_capacity(failures.len());

    for (key, field_failures) in failures.iter() {
        let name = external_name(key);
        let value = body.get(&name).and_then(parameter_value);

        for failure in field_failures {
            tracing::debug!(
                key = cleanse_key(key),
                attempted_value = value.as_deref().unwrap_or("<absent>"),
                error_message = failure.message(),
                "Model error"
            );
            responses.push(ErrorResponse::from_encoded(
                failure.message(),
                Some(name.clone()),
                value.clone(),
            ));
        }
    }

    Ok(responses)
}

// =============================================================================
// Tests
// =============================================================================
