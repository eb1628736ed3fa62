//! Repository trait abstractions
//!
//! These traits define the minimal interface the review workflow needs from
//! persistence, so the orchestrator can be exercised without a database.

use async_trait::async_trait;
use atelier_core::models::{Resource, ResourceDraft, ResourceUpdate, Task, TaskDraft};
use atelier_core::RepositoryError;
use uuid::Uuid;

#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// All resources, in canonical shape.
    async fn list(&self) -> Result<Vec<Resource>, RepositoryError>;

    /// Persist a new resource and return it with its assigned id.
    async fn create(&self, draft: ResourceDraft) -> Result<Resource, RepositoryError>;

    /// Apply a partial update and return the resource as stored afterwards.
    async fn update(&self, id: Uuid, update: ResourceUpdate) -> Result<Resource, RepositoryError>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Persist a new task and return it with its assigned id.
    async fn create(&self, draft: TaskDraft) -> Result<Task, RepositoryError>;
}
