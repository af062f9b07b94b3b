//! `PostgreSQL` repository implementation.
//!
//! Uses `sqlx` with a shared `PgPool`. The table is created on startup if
//! it does not exist yet.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS task (
//!     id SERIAL PRIMARY KEY,
//!     task_name VARCHAR(100) NOT NULL,
//!     is_completed BOOLEAN NOT NULL,
//!     due_date TIMESTAMPTZ NOT NULL,
//!     CONSTRAINT task_task_name_key UNIQUE (task_name)
//! );
//! ```
//!
//! The `UNIQUE` constraint backs up the service's name check: two requests
//! that both pass the check cannot both insert the same name. A violation
//! surfaces as `RepositoryError::Duplicate`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{DueDate, Task, TaskDraft, TaskId};
use crate::infrastructure::{RepositoryError, TaskRepository};

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS task (\
     id SERIAL PRIMARY KEY, \
     task_name VARCHAR(100) NOT NULL, \
     is_completed BOOLEAN NOT NULL, \
     due_date TIMESTAMPTZ NOT NULL, \
     CONSTRAINT task_task_name_key UNIQUE (task_name))";

type TaskRow = (i32, String, bool, DateTime<Utc>);

fn task_from_row((id, task_name, is_completed, due_date): TaskRow) -> Task {
    TaskDraft::new(task_name, is_completed, DueDate::from_datetime(due_date)).into_task(TaskId::new(id))
}

/// Maps a `sqlx` error, singling out unique-constraint violations.
fn map_database_error(error: sqlx::Error, task_name: &str) -> RepositoryError {
    match &error {
        sqlx::Error::Database(database_error) if database_error.is_unique_violation() => {
            RepositoryError::Duplicate(task_name.to_string())
        }
        _ => RepositoryError::DatabaseError(error.to_string()),
    }
}

fn database_error(error: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(error.to_string())
}

/// `PostgreSQL` implementation of `TaskRepository`.
///
/// # Example
///
/// ```ignore
/// use task_list::infrastructure::PostgresTaskRepository;
///
/// let pool = PgPool::connect("postgres://localhost/tasks").await?;
/// let repository = PostgresTaskRepository::new(pool);
/// repository.ensure_schema().await?;
/// ```
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new `PostgreSQL` task repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the `task` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if the statement fails.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(CREATE_TABLE_SQL)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn insert(&self, draft: &TaskDraft) -> Result<Task, RepositoryError> {
        let row: TaskRow = sqlx::query_as(
            "INSERT INTO task (task_name, is_completed, due_date) VALUES ($1, $2, $3) \
             RETURNING id, task_name, is_completed, due_date",
        )
        .bind(&draft.task_name)
        .bind(draft.is_completed)
        .bind(draft.due_date.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_database_error(error, &draft.task_name))?;

        Ok(task_from_row(row))
    }

    async fn update(&self, id: TaskId, draft: &TaskDraft) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE task SET task_name = $1, is_completed = $2, due_date = $3 WHERE id = $4",
        )
        .bind(&draft.task_name)
        .bind(draft.is_completed)
        .bind(draft.due_date.as_datetime())
        .bind(id.value())
        .execute(&self.pool)
        .await
        .map_err(|error| map_database_error(error, &draft.task_name))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: TaskId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM task WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, RepositoryError> {
        let row: Option<TaskRow> = sqlx::query_as(
            "SELECT id, task_name, is_completed, due_date FROM task WHERE id = $1",
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(task_from_row))
    }

    async fn find_by_name(&self, task_name: &str) -> Result<Option<Task>, RepositoryError> {
        let row: Option<TaskRow> = sqlx::query_as(
            "SELECT id, task_name, is_completed, due_date FROM task WHERE task_name = $1",
        )
        .bind(task_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(task_from_row))
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM task")
            .fetch_one(&self.pool)
            .await
            .map_err(database_error)?;

        u64::try_from(count).map_err(|error| RepositoryError::CorruptRow(error.to_string()))
    }

    async fn list_ids(&self) -> Result<Vec<TaskId>, RepositoryError> {
        let rows: Vec<(i32,)> = sqlx::query_as("SELECT id FROM task ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(rows.into_iter().map(|(id,)| TaskId::new(id)).collect())
    }
}

// =============================================================================
// Tests
// =============================================================================
