//! Startup seed data.

use chrono::NaiveDate;

use crate::domain::{DueDate, TaskDraft};
use crate::infrastructure::{RepositoryError, TaskRepository};

const SEED_TASKS: [(&str, bool, (i32, u32, u32)); 4] = [
    ("Buy groceries", false, (2021, 2, 3)),
    ("Workout", true, (2021, 1, 1)),
    ("Paint Fence", false, (2021, 3, 15)),
    ("Mow Lawn", false, (2021, 6, 11)),
];

/// Returns the drafts inserted into an empty store.
#[must_use]
pub fn seed_drafts() -> Vec<TaskDraft> {
    SEED_TASKS
        .iter()
        .filter_map(|&(name, is_completed, (year, month, day))| {
            let midnight = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
            Some(TaskDraft::new(
                name,
                is_completed,
                DueDate::from_datetime(midnight.and_utc()),
            ))
        })
        .collect()
}

/// Inserts the seed tasks if, and only if, the store holds no tasks.
///
/// At most `max_task_entries` tasks are inserted, so a seeded store never
/// starts above the task limit. Returns the number of tasks inserted.
///
/// # Errors
///
/// Returns the first `RepositoryError` raised by the store.
pub async fn seed_if_empty(
    repository: &dyn TaskRepository,
    max_task_entries: usize,
) -> Result<usize, RepositoryError> {
    if repository.count().await? > 0 {
        tracing::debug!("Task store already has data, skipping seed");
        return Ok(0);
    }

    let drafts = seed_drafts();
    if drafts.len() > max_task_entries {
        tracing::warn!(
            max_task_entries,
            available = drafts.len(),
            "Task limit is below the seed size, seeding a prefix only"
        );
    }

    let mut inserted = 0;
    for draft in drafts.iter().take(max_task_entries) {
        repository.insert(draft).await?;
        inserted += 1;
    }

    tracing::info!(count = inserted, "Seeded task store");
    Ok(inserted)
}
