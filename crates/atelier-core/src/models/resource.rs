use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;
use validator::ValidateUrl;

use super::review::{ReviewRecord, ReviewStatus};

/// Kind of deliverable. Closed set; anything unrecognised is `Unknown`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Image,
    Video,
    Audio,
    Document,
    Archive,
    Url,
    #[default]
    Unknown,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Image => "image",
            ResourceType::Video => "video",
            ResourceType::Audio => "audio",
            ResourceType::Document => "document",
            ResourceType::Archive => "archive",
            ResourceType::Url => "url",
            ResourceType::Unknown => "unknown",
        }
    }
}

impl Display for ResourceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(ResourceType::Image),
            "video" => Ok(ResourceType::Video),
            "audio" => Ok(ResourceType::Audio),
            "document" => Ok(ResourceType::Document),
            "archive" => Ok(ResourceType::Archive),
            "url" => Ok(ResourceType::Url),
            "unknown" => Ok(ResourceType::Unknown),
            _ => Err(anyhow::anyhow!("Invalid resource type: {}", s)),
        }
    }
}

/// A creative deliverable under review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub resource_type: ResourceType,
    pub category: String,
    pub tags: BTreeSet<String>,
    pub brand_id: Option<Uuid>,
    /// Display name of the owning brand, resolved by the repository adapter.
    pub brand_name: Option<String>,
    /// Display name of the brand's client, resolved by the repository adapter.
    pub client_name: Option<String>,
    /// Primary (originating) task.
    pub task_id: Option<Uuid>,
    /// Linked tasks in link order, without duplicates.
    pub related_tasks: Vec<Uuid>,
    pub submitted_by: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub status: ReviewStatus,
    pub review: Option<ReviewRecord>,
    pub url: Option<String>,
}

impl Resource {
    /// Download/view locator, only when it is a well-formed URL.
    pub fn locator(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty() && u.validate_url())
    }

    pub fn can_preview(&self) -> bool {
        self.locator().is_some()
    }

    pub fn is_linked_to(&self, task_id: Uuid) -> bool {
        self.related_tasks.contains(&task_id)
    }

    pub fn reviewed_by(&self) -> Option<&str> {
        self.review.as_ref().map(|r| r.reviewed_by.as_str())
    }

    pub fn review_notes(&self) -> Option<&str> {
        self.review.as_ref().and_then(|r| r.notes.as_deref())
    }

    /// Uploader identity, ignoring blank values.
    pub fn uploader(&self) -> Option<&str> {
        self.submitted_by
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Fields of a resource before the repository assigns it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDraft {
    pub name: String,
    pub description: String,
    pub resource_type: ResourceType,
    pub category: String,
    pub tags: BTreeSet<String>,
    pub brand_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub related_tasks: Vec<Uuid>,
    pub submitted_by: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub status: ReviewStatus,
    pub url: Option<String>,
}

/// Partial update of a resource. `None` leaves a field untouched; for
/// `review`, `Some(None)` clears the review metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceUpdate {
    pub status: Option<ReviewStatus>,
    pub review: Option<Option<ReviewRecord>>,
    pub task_id: Option<Uuid>,
    pub related_tasks: Option<Vec<Uuid>>,
}

impl ResourceUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.review.is_none()
            && self.task_id.is_none()
            && self.related_tasks.is_none()
    }

    /// Return a copy of `resource` with this update applied.
    pub fn apply_to(&self, resource: &Resource) -> Resource {
        let mut updated = resource.clone();
        if let Some(status) = self.status {
            updated.status = status;
        }
        if let Some(review) = &self.review {
            updated.review = review.clone();
        }
        if let Some(task_id) = self.task_id {
            updated.task_id = Some(task_id);
        }
        if let Some(related) = &self.related_tasks {
            updated.related_tasks = related.clone();
        }
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource_with_url(url: Option<&str>) -> Resource {
        Resource {
            id: Uuid::new_v4(),
            name: "Banner v1".to_string(),
            description: String::new(),
            resource_type: ResourceType::Image,
            category: "social".to_string(),
            tags: BTreeSet::new(),
            brand_id: None,
            brand_name: None,
            client_name: None,
            task_id: None,
            related_tasks: Vec::new(),
            submitted_by: Some("ana".to_string()),
            uploaded_at: Utc::now(),
            status: ReviewStatus::PendingReview,
            review: None,
            url: url.map(str::to_string),
        }
    }

    #[test]
    fn test_locator_requires_well_formed_url() {
        assert_eq!(
            resource_with_url(Some("https://cdn.example.com/banner.png")).locator(),
            Some("https://cdn.example.com/banner.png")
        );
        assert!(!resource_with_url(Some("not a url")).can_preview());
        assert!(!resource_with_url(Some("   ")).can_preview());
        assert!(!resource_with_url(None).can_preview());
    }

    #[test]
    fn test_uploader_ignores_blank_identity() {
        let mut resource = resource_with_url(None);
        assert_eq!(resource.uploader(), Some("ana"));
        resource.submitted_by = Some("  ".to_string());
        assert_eq!(resource.uploader(), None);
    }

    #[test]
    fn test_empty_update_changes_nothing() {
        let resource = resource_with_url(None);
        let update = ResourceUpdate::default();
        assert!(update.is_empty());
        assert_eq!(update.apply_to(&resource), resource);
    }

    #[test]
    fn test_update_can_clear_review() {
        let mut resource = resource_with_url(None);
        resource.status = ReviewStatus::Rejected;
        resource.review = Some(ReviewRecord {
            reviewed_by: "lead".to_string(),
            reviewed_at: Utc::now(),
            notes: Some("off brand".to_string()),
        });

        let update = ResourceUpdate {
            status: Some(ReviewStatus::PendingReview),
            review: Some(None),
            ..Default::default()
        };
        let updated = update.apply_to(&resource);
        assert_eq!(updated.status, ReviewStatus::PendingReview);
        assert!(updated.review.is_none());
    }
}
