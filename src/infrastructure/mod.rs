//! Infrastructure module for external services.
//!
//! This module contains the task repositories, the factory that picks one
//! at startup, and seed data.

pub mod factory;
pub mod in_memory;
pub mod postgres;
pub mod repository;
pub mod seed;

pub use factory::{
    ConfigurationError, FactoryError, RepositoryConfig, RepositoryFactory, StorageMode,
};
pub use in_memory::InMemoryTaskRepository;
pub use postgres::PostgresTaskRepository;
pub use repository::{RepositoryError, TaskRepository};
pub use seed::{seed_drafts, seed_if_empty};
