use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Review state of a resource.
///
/// `PendingReview` is the state every upload starts in. The other three are
/// review outcomes; a reviewer may move a resource between any of them, or
/// back to `PendingReview` to re-open it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    #[default]
    PendingReview,
    Approved,
    NeedsReview,
    Rejected,
}

impl ReviewStatus {
    pub const ALL: [ReviewStatus; 4] = [
        ReviewStatus::PendingReview,
        ReviewStatus::Approved,
        ReviewStatus::NeedsReview,
        ReviewStatus::Rejected,
    ];

    /// Outcomes that spawn a remedial task. Adding a negative outcome here is
    /// the only change needed for it to generate corrective work.
    pub const REMEDIAL_OUTCOMES: &'static [ReviewStatus] =
        &[ReviewStatus::NeedsReview, ReviewStatus::Rejected];

    pub fn requires_remediation(self) -> bool {
        Self::REMEDIAL_OUTCOMES.contains(&self)
    }

    pub fn is_initial(self) -> bool {
        self == ReviewStatus::PendingReview
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::PendingReview => "pending_review",
            ReviewStatus::Approved => "approved",
            ReviewStatus::NeedsReview => "needs_review",
            ReviewStatus::Rejected => "rejected",
        }
    }
}

impl Display for ReviewStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_review" => Ok(ReviewStatus::PendingReview),
            "approved" => Ok(ReviewStatus::Approved),
            "needs_review" => Ok(ReviewStatus::NeedsReview),
            "rejected" => Ok(ReviewStatus::Rejected),
            _ => Err(anyhow::anyhow!("Invalid review status: {}", s)),
        }
    }
}

/// Who reviewed a resource, when, and what they observed.
///
/// Reviewer and timestamp travel together so a resource can never carry one
/// without the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub reviewed_by: String,
    pub reviewed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remediation_rule_over_all_statuses() {
        for status in ReviewStatus::ALL {
            let expected = matches!(status, ReviewStatus::NeedsReview | ReviewStatus::Rejected);
            assert_eq!(status.requires_remediation(), expected, "{status}");
        }
    }

    #[test]
    fn test_review_status_round_trips_through_str() {
        for status in ReviewStatus::ALL {
            assert_eq!(status.to_string().parse::<ReviewStatus>().unwrap(), status);
        }
        assert!("rechazado".parse::<ReviewStatus>().is_err());
    }

    #[test]
    fn test_default_is_pending_review() {
        assert!(ReviewStatus::default().is_initial());
        assert!(!ReviewStatus::Approved.is_initial());
    }
}
