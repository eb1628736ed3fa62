//! PostgreSQL repositories over the backend's document tables
//!
//! Every entity is stored as one JSONB document per row. Reads go through
//! `crate::legacy` so that documents written by older clients come back in
//! canonical shape; writes always use canonical keys.

pub mod pool;
pub mod resource;
pub mod task;

pub use pool::{connect, run_migrations};
pub use resource::PgResourceRepository;
pub use task::PgTaskRepository;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Row shape shared by all document tables.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct DocumentRow {
    pub id: Uuid,
    pub data: JsonValue,
    pub created_at: DateTime<Utc>,
}
