//! Upload descriptors handed over by the file-upload collaborator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;
use validator::Validate;

use super::resource::{ResourceDraft, ResourceType};
use super::review::ReviewStatus;

/// A deliverable that has already been stored and needs a resource record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UploadDescriptor {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    #[serde(default)]
    pub resource_type: ResourceType,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub category: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub brand_id: Option<Uuid>,
    #[serde(default)]
    pub task_id: Option<Uuid>,
    #[serde(default)]
    pub url: Option<String>,
}

impl UploadDescriptor {
    /// Stamp the descriptor as a fresh submission from `uploader`.
    ///
    /// A primary task given at upload time is also recorded as the first
    /// related task.
    pub fn into_draft(self, uploader: &str, uploaded_at: DateTime<Utc>) -> ResourceDraft {
        let related_tasks = self.task_id.into_iter().collect();
        ResourceDraft {
            name: self.name.trim().to_string(),
            description: self.description,
            resource_type: self.resource_type,
            category: self.category,
            tags: self.tags,
            brand_id: self.brand_id,
            task_id: self.task_id,
            related_tasks,
            submitted_by: Some(uploader.trim().to_string()),
            uploaded_at,
            status: ReviewStatus::PendingReview,
            url: self.url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str) -> UploadDescriptor {
        UploadDescriptor {
            name: name.to_string(),
            description: "Spring campaign hero".to_string(),
            resource_type: ResourceType::Image,
            category: "social".to_string(),
            tags: BTreeSet::from(["spring".to_string()]),
            brand_id: None,
            task_id: None,
            url: Some("https://cdn.example.com/hero.png".to_string()),
        }
    }

    #[test]
    fn test_validation_rejects_empty_name() {
        assert!(descriptor("hero.png").validate().is_ok());
        assert!(descriptor("").validate().is_err());
        assert!(descriptor(&"x".repeat(256)).validate().is_err());
    }

    #[test]
    fn test_into_draft_stamps_pending_review_and_uploader() {
        let task_id = Uuid::new_v4();
        let mut d = descriptor(" hero.png ");
        d.task_id = Some(task_id);

        let now = Utc::now();
        let draft = d.into_draft("ana", now);
        assert_eq!(draft.name, "hero.png");
        assert_eq!(draft.status, ReviewStatus::PendingReview);
        assert_eq!(draft.submitted_by.as_deref(), Some("ana"));
        assert_eq!(draft.uploaded_at, now);
        assert_eq!(draft.related_tasks, vec![task_id]);
    }

    #[test]
    fn test_descriptor_deserializes_with_defaults() {
        let d: UploadDescriptor = serde_json::from_str(r#"{"name":"brief.pdf"}"#).unwrap();
        assert_eq!(d.resource_type, ResourceType::Unknown);
        assert!(d.tags.is_empty());
        assert!(d.url.is_none());
    }
}
