use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::{Task, TaskDraft};

/// The dependent step of an orchestrated operation that did not complete
/// after its primary step was persisted. Passing it back to the orchestrator
/// re-issues only this step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum PendingStep {
    /// The resource has its new review status but the remedial task was not created.
    RemedialTask { resource_id: Uuid, draft: TaskDraft },
    /// The task exists but the resource was not updated to reference it.
    ResourceLink { resource_id: Uuid, task: Task },
}

impl PendingStep {
    pub fn resource_id(&self) -> Uuid {
        match self {
            PendingStep::RemedialTask { resource_id, .. }
            | PendingStep::ResourceLink { resource_id, .. } => *resource_id,
        }
    }

    /// Short hint suitable for showing next to a partial success.
    pub fn remediation_hint(&self) -> &'static str {
        match self {
            PendingStep::RemedialTask { .. } => {
                "Review saved, but the remedial task was not created; retry task creation"
            }
            PendingStep::ResourceLink { .. } => {
                "Task created, but the resource was not linked to it; retry the link"
            }
        }
    }
}
