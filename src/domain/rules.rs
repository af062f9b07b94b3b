//! Cross-record business rules for task writes.
//!
//! Structural validation only sees one payload at a time. The rules here
//! need the rest of the store: how many tasks exist, and whether another
//! task already uses a name. Each check is a pure function over values the
//! caller has already fetched, so the order they run in is decided entirely
//! by the caller (see `TaskService`).

use thiserror::Error;

use super::task::{Task, TaskId};

/// A business rule that rejected a write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    /// The store already holds the configured maximum number of tasks.
    #[error("task limit of {limit} reached")]
    CapacityExceeded { limit: usize },

    /// Another task already uses the requested name.
    #[error("a task named {task_name:?} already exists")]
    NameTaken { task_name: String },

    /// The addressed task does not exist.
    #[error("task {id} not found")]
    NotFound { id: TaskId },
}

/// Allows a create only while the store holds fewer than `max_task_entries` tasks.
///
/// # Errors
///
/// Returns `RuleViolation::CapacityExceeded` when `current_count >= max_task_entries`.
pub const fn check_capacity(current_count: u64, max_task_entries: usize) -> Result<(), RuleViolation> {
    if current_count >= max_task_entries as u64 {
        return Err(RuleViolation::CapacityExceeded {
            limit: max_task_entries,
        });
    }
    Ok(())
}

/// Allows a name unless a *different* task already holds it.
///
/// `existing` is the result of looking the candidate name up in the store.
/// `exclude_id` is the task being updated, so renaming a task to its own
/// current name passes; it is `None` on create.
///
/// # Errors
///
/// Returns `RuleViolation::NameTaken` when `existing` holds a task whose id
/// differs from `exclude_id`.
pub fn check_name_unique(
    existing: Option<&Task>,
    candidate: &str,
    exclude_id: Option<TaskId>,
) -> Result<(), RuleViolation> {
    match existing {
        Some(task) if task.task_name == candidate && Some(task.id) != exclude_id => {
            Err(RuleViolation::NameTaken {
                task_name: candidate.to_string(),
            })
        }
        _ => Ok(()),
    }
}

/// Turns a lookup result into the task or a not-found violation.
///
/// # Errors
///
/// Returns `RuleViolation::NotFound` when `found` is `None`.
pub fn check_exists<T>(id: TaskId, found: Option<T>) -> Result<T, RuleViolation> {
    found.ok_or(RuleViolation::NotFound { id })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DueDate, TaskDraft};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn stored(id: i32, name: &str) -> Task {
        let due_date = DueDate::from_datetime(Utc.with_ymd_and_hms(2021, 2, 3, 0, 0, 0).unwrap());
        TaskDraft::new(name, false, due_date).into_task(TaskId::new(id))
    }

    // -------------------------------------------------------------------------
    // Capacity
    // -------------------------------------------------------------------------

    #[rstest]
    #[case(0, 100)]
    #[case(99, 100)]
    #[case(1, 2)]
    fn test_check_capacity_allows_below_limit(#[case] count: u64, #[case] limit: usize) {
        assert_eq!(check_capacity(count, limit), Ok(()));
    }

    #[rstest]
    #[case(2, 2)]
    #[case(100, 100)]
    #[case(150, 100)]
    fn test_check_capacity_denies_at_or_above_limit(#[case] count: u64, #[case] limit: usize) {
        assert_eq!(
            check_capacity(count, limit),
            Err(RuleViolation::CapacityExceeded { limit })
        );
    }

    // -------------------------------------------------------------------------
    // Name uniqueness
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_check_name_unique_allows_unused_name() {
        assert_eq!(check_name_unique(None, "Buy groceries", None), Ok(()));
    }

    #[rstest]
    fn test_check_name_unique_denies_existing_name_on_create() {
        let existing = stored(1, "Buy groceries");

        assert_eq!(
            check_name_unique(Some(&existing), "Buy groceries", None),
            Err(RuleViolation::NameTaken {
                task_name: "Buy groceries".to_string()
            })
        );
    }

    #[rstest]
    fn test_check_name_unique_allows_renaming_to_own_name() {
        let existing = stored(3, "Paint Fence");

        assert_eq!(
            check_name_unique(Some(&existing), "Paint Fence", Some(TaskId::new(3))),
            Ok(())
        );
    }

    #[rstest]
    fn test_check_name_unique_denies_name_of_other_task_on_update() {
        let existing = stored(3, "Paint Fence");

        assert!(matches!(
            check_name_unique(Some(&existing), "Paint Fence", Some(TaskId::new(4))),
            Err(RuleViolation::NameTaken { .. })
        ));
    }

    // -------------------------------------------------------------------------
    // Existence
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_check_exists_passes_value_through() {
        let task = stored(5, "Mow Lawn");
        let found = check_exists(TaskId::new(5), Some(task.clone()));
        assert_eq!(found, Ok(task));
    }

    #[rstest]
    fn test_check_exists_reports_id() {
        let missing: Option<Task> = None;
        assert_eq!(
            check_exists(TaskId::new(99), missing),
            Err(RuleViolation::NotFound {
                id: TaskId::new(99)
            })
        );
    }

    #[rstest]
    fn test_rule_violation_display() {
        let violation = RuleViolation::CapacityExceeded { limit: 2 };
        assert_eq!(violation.to_string(), "task limit of 2 reached");
    }
}
