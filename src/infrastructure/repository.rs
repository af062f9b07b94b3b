//! Repository trait for the task store.
//!
//! The service layer only talks to `dyn TaskRepository`, so the backend
//! (in-memory or `PostgreSQL`) is chosen at startup and test doubles are
//! plain values rather than process-wide state.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Task, TaskDraft, TaskId};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// A storage-level uniqueness constraint rejected the task name.
    #[error("Duplicate task name: {0}")]
    Duplicate(String),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A stored row could not be mapped back into a task.
    #[error("Corrupt row: {0}")]
    CorruptRow(String),
}

// =============================================================================
// Task Repository
// =============================================================================

/// Persistence operations over the task table.
///
/// None of these methods enforce business rules. Capacity and name
/// uniqueness are checked by the caller beforehand, so two concurrent
/// writers can both pass those checks before either inserts.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Inserts a new task and returns it with its store-assigned id.
    async fn insert(&self, draft: &TaskDraft) -> Result<Task, RepositoryError>;

    /// Replaces every writable field of the task with the given id.
    ///
    /// Returns `Ok(false)` if no task with that id exists.
    async fn update(&self, id: TaskId, draft: &TaskDraft) -> Result<bool, RepositoryError>;

    /// Deletes the task with the given id.
    ///
    /// Returns `Ok(true)` if the task was deleted, `Ok(false)` if it didn't exist.
    async fn delete(&self, id: TaskId) -> Result<bool, RepositoryError>;

    /// Finds a task by its id.
    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, RepositoryError>;

    /// Finds the task whose name equals `task_name` exactly.
    async fn find_by_name(&self, task_name: &str) -> Result<Option<Task>, RepositoryError>;

    /// Counts all tasks.
    async fn count(&self) -> Result<u64, RepositoryError>;

    /// Lists the ids of all tasks in ascending order.
    async fn list_ids(&self) -> Result<Vec<TaskId>, RepositoryError>;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_repository_error_display() {
        let error = RepositoryError::Duplicate("Workout".to_string());
        assert_eq!(format!("{error}"), "Duplicate task name: Workout");

        let error = RepositoryError::DatabaseError("connection refused".to_string());
        assert_eq!(format!("{error}"), "Database error: connection refused");

        let error = RepositoryError::CorruptRow("negative id".to_string());
        assert_eq!(format!("{error}"), "Corrupt row: negative id");
    }
}
