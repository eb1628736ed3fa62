//! Remedial task generation for negative review outcomes

use atelier_core::models::{Resource, ReviewStatus, TaskDraft, TaskPriority, TaskStatus};
use atelier_core::WorkflowError;
use chrono::{DateTime, Duration, Utc};

/// Days the uploader gets to address a negative review.
pub const REMEDIAL_DUE_DAYS: i64 = 3;

fn title_prefix(outcome: ReviewStatus) -> Option<&'static str> {
    match outcome {
        ReviewStatus::Rejected => Some("Corrección requerida"),
        ReviewStatus::NeedsReview => Some("Revisión requerida"),
        ReviewStatus::PendingReview | ReviewStatus::Approved => None,
    }
}

/// Build the corrective task for `resource`, assigned to its uploader.
pub fn generate(
    resource: &Resource,
    observations: &str,
    outcome: ReviewStatus,
    now: DateTime<Utc>,
) -> Result<TaskDraft, WorkflowError> {
    let prefix = title_prefix(outcome).ok_or_else(|| {
        WorkflowError::Validation(format!("{} does not call for a remedial task", outcome))
    })?;
    let assignee = resource
        .uploader()
        .ok_or(WorkflowError::MissingUploader {
            resource_id: resource.id,
        })?;

    Ok(TaskDraft {
        title: format!("{}: {}", prefix, resource.name),
        description: format!(
            "El recurso \"{}\" requiere cambios tras la revisión.\n\nObservaciones:\n{}",
            resource.name, observations
        ),
        brand_id: resource.brand_id,
        status: TaskStatus::AttentionRequired,
        priority: TaskPriority::Urgent,
        assignee: Some(assignee.to_string()),
        due_date: now + Duration::days(REMEDIAL_DUE_DAYS),
        related_resource_id: Some(resource.id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_db::test_helpers::{fixed_now, sample_resource};

    #[test]
    fn test_rejection_task() {
        let resource = sample_resource("Banner v1", Some("ana"));
        let draft = generate(
            &resource,
            "wrong brand colors",
            ReviewStatus::Rejected,
            fixed_now(),
        )
        .unwrap();

        assert_eq!(draft.title, "Corrección requerida: Banner v1");
        assert!(draft.description.contains("Banner v1"));
        assert!(draft.description.ends_with("wrong brand colors"));
        assert_eq!(draft.assignee.as_deref(), Some("ana"));
        assert_eq!(draft.priority, TaskPriority::Urgent);
        assert_eq!(draft.status, TaskStatus::AttentionRequired);
        assert_eq!(draft.due_date, fixed_now() + Duration::days(3));
        assert_eq!(draft.related_resource_id, Some(resource.id));
        assert_eq!(draft.brand_id, resource.brand_id);
    }

    #[test]
    fn test_needs_review_title() {
        let resource = sample_resource("Spot 30s", Some("ana"));
        let draft = generate(&resource, "check audio", ReviewStatus::NeedsReview, fixed_now())
            .unwrap();
        assert_eq!(draft.title, "Revisión requerida: Spot 30s");
    }

    #[test]
    fn test_missing_uploader() {
        for uploader in [None, Some("   ")] {
            let resource = sample_resource("Banner v1", uploader);
            let err = generate(&resource, "x", ReviewStatus::Rejected, fixed_now()).unwrap_err();
            assert!(
                matches!(err, WorkflowError::MissingUploader { resource_id } if resource_id == resource.id)
            );
        }
    }

    #[test]
    fn test_positive_outcome_is_rejected() {
        let resource = sample_resource("Banner v1", Some("ana"));
        assert!(generate(&resource, "fine", ReviewStatus::Approved, fixed_now()).is_err());
    }
}
