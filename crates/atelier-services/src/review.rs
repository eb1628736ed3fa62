//! Approval state machine
//!
//! Any status may move to any other; the machine only records who reviewed,
//! when, and why, and tells the caller whether remedial work is needed.

use atelier_core::models::{Resource, ResourceUpdate, ReviewRecord, ReviewStatus};
use atelier_core::WorkflowError;
use chrono::{DateTime, Utc};

/// Result of a validated status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub update: ResourceUpdate,
    pub requires_remedial_task: bool,
}

/// Validate a review decision on `resource` and build its update payload.
///
/// Observations are stored verbatim. Moving back to `PendingReview` clears
/// the review metadata.
pub fn apply_transition(
    resource: &Resource,
    target: ReviewStatus,
    reviewer: &str,
    observations: &str,
    now: DateTime<Utc>,
) -> Result<Transition, WorkflowError> {
    let reviewer = reviewer.trim();
    if reviewer.is_empty() {
        return Err(WorkflowError::Unauthorized(
            "A reviewer identity is required to change review status".to_string(),
        ));
    }

    let requires_remedial_task = target.requires_remediation();
    let notes = Some(observations).filter(|o| !o.trim().is_empty());
    if requires_remedial_task && notes.is_none() {
        return Err(WorkflowError::Validation(format!(
            "Observations are required to mark \"{}\" as {}",
            resource.name, target
        )));
    }

    let review = if target.is_initial() {
        None
    } else {
        Some(ReviewRecord {
            reviewed_by: reviewer.to_string(),
            reviewed_at: now,
            notes: notes.map(str::to_string),
        })
    };

    Ok(Transition {
        update: ResourceUpdate {
            status: Some(target),
            review: Some(review),
            ..Default::default()
        },
        requires_remedial_task,
    })
}
