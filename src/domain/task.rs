//! Task domain model.
//!
//! A task is the only persisted entity: a name, a completion flag and a due
//! date, identified by a store-assigned integer.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of characters allowed in a task name.
pub const MAX_TASK_NAME_LENGTH: usize = 100;

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Unique identifier for a task.
///
/// Assigned by the store on insert and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(i32);

impl TaskId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl From<i32> for TaskId {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

/// The date a task is due, always held in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DueDate(DateTime<Utc>);

impl DueDate {
    /// Creates a `DueDate` from a `DateTime<Utc>`.
    #[must_use]
    pub const fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Returns the inner `DateTime<Utc>`.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Parses a due date from its textual form.
    ///
    /// Accepts, in order of preference:
    /// - RFC 3339 date-times with an offset (`2021-02-03T10:00:00+02:00`)
    /// - naive date-times, taken as UTC (`2021-02-03T10:00:00`, optional fraction)
    /// - bare dates, taken as midnight UTC (`2021-02-03`)
    ///
    /// Returns `None` if the text matches none of these forms, including
    /// when it carries leading or trailing whitespace.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        // chrono's numeric fields skip leading whitespace on their own.
        if text.trim() != text {
            return None;
        }

        if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
            return Some(Self(datetime.with_timezone(&Utc)));
        }

        if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(Self(naive.and_utc()));
        }

        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Self(naive.and_utc()))
    }
}

impl std::fmt::Display for DueDate {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0.to_rfc3339())
    }
}

// =============================================================================
// Task
// =============================================================================

/// The writable fields of a task.
///
/// Used both for inserts (the store assigns the id) and for full-record
/// replacement on update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    /// Name of the task, unique across all tasks.
    pub task_name: String,
    /// Whether the task has been completed.
    pub is_completed: bool,
    /// When the task is due.
    pub due_date: DueDate,
}

impl TaskDraft {
    /// Creates a new draft.
    #[must_use]
    pub fn new(task_name: impl Into<String>, is_completed: bool, due_date: DueDate) -> Self {
        Self {
            task_name: task_name.into(),
            is_completed,
            due_date,
        }
    }

    /// Attaches a store-assigned id, producing a persisted task.
    #[must_use]
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            task_name: self.task_name,
            is_completed: self.is_completed,
            due_date: self.due_date,
        }
    }
}

/// A persisted task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier.
    pub id: TaskId,
    /// Name of the task.
    pub task_name: String,
    /// Whether the task has been completed.
    pub is_completed: bool,
    /// When the task is due.
    pub due_date: DueDate,
}

impl Task {
    /// Returns a copy of this task with every writable field replaced.
    ///
    /// The id is kept as is.
    #[must_use]
    pub fn replace(&self, draft: TaskDraft) -> Self {
        draft.into_task(self.id)
    }
}

// =============================================================================
// Tests
// =============================================================================
