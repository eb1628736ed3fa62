//! Helpers shared by the `review_desk` binary.

use atelier_core::models::Resource;
use atelier_core::{ErrorMetadata, WorkflowError};
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::{json, Value as JsonValue};

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,atelier=info")),
        )
        .init();
}

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// `now` plus `days`, rejecting offsets chrono cannot represent.
pub fn due_in_days(now: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>, WorkflowError> {
    TimeDelta::try_days(days)
        .and_then(|offset| now.checked_add_signed(offset))
        .ok_or_else(|| WorkflowError::Validation(format!("--due-days {} is out of range", days)))
}

/// Plain-text table of resources, one row per resource.
pub fn resource_table(resources: &[Resource]) -> String {
    let mut out = format!(
        "{:<36} {:<14} {:<8} {:<30} {:<20} {:<16} {:<7}\n",
        "ID", "Status", "Type", "Name", "Brand", "Submitted by", "Preview"
    );
    out.push_str(&"-".repeat(135));
    out.push('\n');
    for r in resources {
        out.push_str(&format!(
            "{:<36} {:<14} {:<8} {:<30} {:<20} {:<16} {:<7}\n",
            r.id,
            r.status.as_str(),
            r.resource_type.as_str(),
            truncate_string(&r.name, 30),
            truncate_string(r.brand_name.as_deref().unwrap_or("-"), 20),
            truncate_string(r.submitted_by.as_deref().unwrap_or("-"), 16),
            if r.can_preview() { "yes" } else { "no" },
        ));
    }
    out
}

/// JSON error body; partial failures include the pending step so it can be
/// passed back to `review_desk retry`.
pub fn error_report(err: &WorkflowError) -> JsonValue {
    let mut report = json!({
        "error": err.to_string(),
        "code": err.error_code(),
        "kind": err.kind().to_string(),
        "recoverable": err.is_recoverable(),
        "suggested_action": err.suggested_action(),
    });
    if let Some(pending) = err.pending_step() {
        report["pending"] = json!(pending);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::models::{PendingStep, TaskDraft, TaskPriority, TaskStatus};
    use atelier_core::RepositoryError;
    use atelier_db::test_helpers::{fixed_now, sample_resource};

    #[test]
    fn truncate_string_short() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("", 5), "");
    }

    #[test]
    fn truncate_string_long() {
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("abc", 2), "...");
    }

    #[test]
    fn truncate_string_counts_characters() {
        assert_eq!(truncate_string("Corrección", 10), "Corrección");
        assert_eq!(truncate_string("Corrección requerida", 8), "Corre...");
    }

    #[test]
    fn due_in_days_adds_offset() {
        let due = due_in_days(fixed_now(), 7).unwrap();
        assert_eq!(due, fixed_now() + TimeDelta::days(7));
        assert!(due_in_days(fixed_now(), -1).unwrap() < fixed_now());
    }

    #[test]
    fn due_in_days_rejects_out_of_range_offsets() {
        for days in [i64::MAX, i64::MIN, 200_000_000] {
            let err = due_in_days(fixed_now(), days).unwrap_err();
            assert!(matches!(err, WorkflowError::Validation(_)), "{}", days);
        }
    }

    #[test]
    fn resource_table_has_one_row_per_resource() {
        let resources = vec![
            sample_resource("Banner v1", Some("ana")),
            sample_resource("Spot 30s", None),
        ];
        let table = resource_table(&resources);
        assert_eq!(table.lines().count(), 4);
        assert!(table.contains("Banner v1"));
        assert!(table.contains("pending_review"));
    }

    #[test]
    fn error_report_includes_pending_step() {
        let resource = sample_resource("Banner v1", Some("ana"));
        let draft = TaskDraft {
            title: "Corrección requerida: Banner v1".to_string(),
            description: String::new(),
            brand_id: None,
            status: TaskStatus::AttentionRequired,
            priority: TaskPriority::Urgent,
            assignee: Some("ana".to_string()),
            due_date: fixed_now(),
            related_resource_id: Some(resource.id),
        };
        let pending = PendingStep::RemedialTask {
            resource_id: resource.id,
            draft,
        };
        let err = WorkflowError::partial(resource, pending.clone(), RepositoryError::new("down"));

        let report = error_report(&err);
        assert_eq!(report["code"], "PARTIAL_FAILURE");
        assert_eq!(report["kind"], "partial_failure");
        let back: PendingStep = serde_json::from_value(report["pending"].clone()).unwrap();
        assert_eq!(back, pending);
    }

    #[test]
    fn error_report_without_pending_step() {
        let report = error_report(&WorkflowError::NotFound("Resource x".to_string()));
        assert_eq!(report["code"], "NOT_FOUND");
        assert!(report.get("pending").is_none());
    }
}
