//! Task operations with their business-rule ordering.
//!
//! The order of the checks decides which single error a client sees when
//! several rules are broken at once:
//!
//! - create: capacity, then name uniqueness, then insert
//! - update: name uniqueness (ignoring the task itself), then existence, then write
//!
//! Structural validation has already happened by the time these run. None of
//! the checks hold a lock across the following write.

use crate::domain::{Task, TaskDraft, TaskId, check_capacity, check_exists, check_name_unique};
use crate::infrastructure::TaskRepository;

use super::error::TaskError;

/// Runs task operations against a repository.
#[derive(Clone, Copy)]
pub struct TaskService<'a> {
    repository: &'a dyn TaskRepository,
    max_task_entries: usize,
}

impl<'a> TaskService<'a> {
    /// Creates a service over `repository` that allows at most `max_task_entries` tasks.
    #[must_use]
    pub const fn new(repository: &'a dyn TaskRepository, max_task_entries: usize) -> Self {
        Self {
            repository,
            max_task_entries,
        }
    }

    /// Lists the ids of all tasks.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::Internal` if the store fails.
    pub async fn list_ids(&self) -> Result<Vec<TaskId>, TaskError> {
        Ok(self.repository.list_ids().await?)
    }

    /// Fetches one task.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::NotFound` if no task has this id.
    pub async fn get(&self, id: TaskId) -> Result<Task, TaskError> {
        let found = self.repository.find_by_id(id).await?;
        Ok(check_exists(id, found)?)
    }

    /// Creates a task.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::CapacityExceeded` when the store is full, then
    /// `TaskError::Conflict` when the name is taken.
    pub async fn create(&self, draft: TaskDraft) -> Result<Task, TaskError> {
        let count = self.repository.count().await?;
        check_capacity(count, self.max_task_entries)?;

        let existing = self.repository.find_by_name(&draft.task_name).await?;
        check_name_unique(existing.as_ref(), &draft.task_name, None)?;

        let task = self.repository.insert(&draft).await?;
        tracing::info!(id = %task.id, task_name = %task.task_name, "Task created");
        Ok(task)
    }

    /// Replaces every writable field of a task.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::Conflict` when another task has the name, then
    /// `TaskError::NotFound` when no task has this id.
    pub async fn update(&self, id: TaskId, draft: TaskDraft) -> Result<(), TaskError> {
        let existing = self.repository.find_by_name(&draft.task_name).await?;
        check_name_unique(existing.as_ref(), &draft.task_name, Some(id))?;

        let found = self.repository.find_by_id(id).await?;
        check_exists(id, found)?;

        // The row can vanish between the lookup and the write.
        let updated = self.repository.update(id, &draft).await?;
        check_exists(id, updated.then_some(()))?;

        tracing::info!(%id, "Task updated");
        Ok(())
    }

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::NotFound` if no task has this id, including when
    /// it has already been deleted.
    pub async fn delete(&self, id: TaskId) -> Result<(), TaskError> {
        let deleted = self.repository.delete(id).await?;
        check_exists(id, deleted.then_some(()))?;

        tracing::info!(%id, "Task deleted");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
