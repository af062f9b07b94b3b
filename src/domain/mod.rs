//! Domain module for the task list.
//!
//! This module contains the task model and the business rules that guard
//! writes to it.

pub mod rules;
pub mod task;

pub use rules::{RuleViolation, check_capacity, check_exists, check_name_unique};
pub use task::{DueDate, MAX_TASK_NAME_LENGTH, Task, TaskDraft, TaskId};
