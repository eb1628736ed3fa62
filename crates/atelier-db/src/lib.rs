//! Atelier Database Layer
//!
//! Repository traits consumed by the review workflow, and their PostgreSQL
//! implementations over the backend's JSONB document tables. The `legacy`
//! module is the only code that knows the historical field-name variants of
//! stored documents.

pub mod db;
pub mod legacy;
pub mod repository;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

// Re-exports: PostgreSQL adapters and pool helpers
pub use db::{connect, run_migrations, PgResourceRepository, PgTaskRepository};

// Re-exports: Repository traits
pub use repository::{ResourceRepository, TaskRepository};
