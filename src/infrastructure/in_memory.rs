//! In-memory repository implementation.
//!
//! Suitable for development and tests. Tasks live in a `BTreeMap` keyed by
//! id behind a `tokio::sync::RwLock`; ids come from a counter that never
//! reuses a value, matching an identity column.
//!
//! Each trait method takes the lock once and releases it before returning,
//! so a service-level `count` followed by `insert` is two separate critical
//! sections.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{Task, TaskDraft, TaskId};
use crate::infrastructure::{RepositoryError, TaskRepository};

#[derive(Debug)]
struct TaskTable {
    rows: BTreeMap<TaskId, Task>,
    next_id: i32,
}

impl TaskTable {
    const fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

/// In-memory implementation of `TaskRepository`.
///
/// Cloning is cheap and clones share the same table.
///
/// # Example
///
/// ```ignore
/// use task_list::infrastructure::InMemoryTaskRepository;
///
/// let repository = InMemoryTaskRepository::new();
/// let task = repository.insert(&draft).await?;
/// let found = repository.find_by_id(task.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryTaskRepository {
    table: Arc<RwLock<TaskTable>>,
}

impl InMemoryTaskRepository {
    /// Creates a new empty in-memory task repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(TaskTable::new())),
        }
    }
}

impl Default for InMemoryTaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn insert(&self, draft: &TaskDraft) -> Result<Task, RepositoryError> {
        let mut table = self.table.write().await;
        let id = TaskId::new(table.next_id);
        table.next_id = table
            .next_id
            .checked_add(1)
            .ok_or_else(|| RepositoryError::DatabaseError("task id space exhausted".to_string()))?;

        let task = draft.clone().into_task(id);
        table.rows.insert(id, task.clone());
        drop(table);
        Ok(task)
    }

    async fn update(&self, id: TaskId, draft: &TaskDraft) -> Result<bool, RepositoryError> {
        let mut table = self.table.write().await;
        let Some(row) = table.rows.get_mut(&id) else {
            return Ok(false);
        };
        *row = row.replace(draft.clone());
        drop(table);
        Ok(true)
    }

    async fn delete(&self, id: TaskId) -> Result<bool, RepositoryError> {
        let mut table = self.table.write().await;
        Ok(table.rows.remove(&id).is_some())
    }

    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn find_by_name(&self, task_name: &str) -> Result<Option<Task>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|task| task.task_name == task_name)
            .cloned())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let table = self.table.read().await;
        Ok(table.rows.len() as u64)
    }

    async fn list_ids(&self) -> Result<Vec<TaskId>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table.rows.keys().copied().collect())
    }
}

// =============================================================================
// Tests
// =============================================================================
