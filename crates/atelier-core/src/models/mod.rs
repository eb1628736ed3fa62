//! Data models for the review workflow
//!
//! Each sub-module represents one concept: the deliverable under review, the
//! minimal task shape, review state, upload descriptors, and the record of a
//! step left undone by a partial failure.

mod pending;
mod resource;
mod review;
mod task;
mod upload;

pub use pending::PendingStep;
pub use resource::{Resource, ResourceDraft, ResourceType, ResourceUpdate};
pub use review::{ReviewRecord, ReviewStatus};
pub use task::{Task, TaskDraft, TaskPriority, TaskStatus};
pub use upload::UploadDescriptor;
