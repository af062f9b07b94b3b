//! Task List API Library
//!
//! A small task list service: CRUD over tasks with field-level validation
//! errors, a capacity limit and unique task names.

pub mod api;
pub mod domain;
pub mod infrastructure;
