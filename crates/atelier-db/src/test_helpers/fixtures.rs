//! Sample resources

use atelier_core::models::{Resource, ResourceType, ReviewStatus};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Fixed instant so that due dates and review times are predictable.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Pending image resource uploaded by `uploader`.
pub fn sample_resource(name: &str, uploader: Option<&str>) -> Resource {
    Resource {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: String::new(),
        resource_type: ResourceType::Image,
        category: "social".to_string(),
        tags: BTreeSet::new(),
        brand_id: Some(Uuid::new_v4()),
        brand_name: Some("Acme Cola".to_string()),
        client_name: Some("Acme Holdings".to_string()),
        task_id: None,
        related_tasks: Vec::new(),
        submitted_by: uploader.map(str::to_string),
        uploaded_at: fixed_now() - Duration::days(1),
        status: ReviewStatus::PendingReview,
        review: None,
        url: Some(format!("https://cdn.example.com/{}.png", Uuid::new_v4())),
    }
}
