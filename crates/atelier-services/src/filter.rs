//! Resource filtering for list views

use atelier_core::models::{Resource, ResourceType, ReviewStatus};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Search term plus optional categorical filters. The default matches all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub search_term: String,
    #[serde(default)]
    pub status: Option<ReviewStatus>,
    #[serde(default)]
    pub resource_type: Option<ResourceType>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.search_term.trim().is_empty() && self.status.is_none() && self.resource_type.is_none()
    }

    pub fn matches(&self, resource: &Resource) -> bool {
        if self.status.is_some_and(|s| s != resource.status) {
            return false;
        }
        if self.resource_type.is_some_and(|t| t != resource.resource_type) {
            return false;
        }

        let term = self.search_term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        [
            Some(resource.name.as_str()),
            Some(resource.description.as_str()),
            resource.brand_name.as_deref(),
            resource.client_name.as_deref(),
            resource.submitted_by.as_deref(),
            resource.reviewed_by(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&term))
    }
}

/// Parses list-view query strings such as `status=rejected&type=image&q=banner`.
/// Empty values are wildcards; unknown keys are ignored.
impl FromStr for FilterState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut state = FilterState::default();
        for pair in s.trim_start_matches('?').split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = value.replace('+', " ");
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key {
                "q" | "search" => state.search_term = value.to_string(),
                "status" => state.status = Some(value.parse()?),
                "type" | "resource_type" => state.resource_type = Some(value.parse()?),
                _ => {}
            }
        }
        Ok(state)
    }
}

/// Resources matching `state`, in input order.
pub fn filter<'a>(resources: &'a [Resource], state: &FilterState) -> Vec<&'a Resource> {
    resources.iter().filter(|r| state.matches(r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::models::ReviewRecord;
    use atelier_db::test_helpers::{fixed_now, sample_resource};

    fn catalogue() -> Vec<Resource> {
        let banner = sample_resource("Banner v1", Some("ana"));

        let mut spot = sample_resource("Spot 30s", Some("luis"));
        spot.resource_type = ResourceType::Video;
        spot.client_name = Some("Northwind".to_string());

        let mut deck = sample_resource("Pitch deck", Some("marta"));
        deck.resource_type = ResourceType::Document;
        deck.status = ReviewStatus::Rejected;
        deck.review = Some(ReviewRecord {
            reviewed_by: "Carla Lead".to_string(),
            reviewed_at: fixed_now(),
            notes: Some("fonts".to_string()),
        });

        vec![banner, spot, deck]
    }

    fn names<'a>(found: &[&'a Resource]) -> Vec<&'a str> {
        found.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_is_identity() {
        let resources = catalogue();
        let found = filter(&resources, &FilterState::default());
        assert_eq!(found.len(), resources.len());
        assert!(found.iter().zip(&resources).all(|(a, b)| a.id == b.id));
    }

    #[test]
    fn test_no_match_is_empty() {
        let state = FilterState {
            search_term: "zzz-no-match".to_string(),
            ..Default::default()
        };
        assert!(filter(&catalogue(), &state).is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let resources = catalogue();
        let by = |term: &str| {
            let state = FilterState {
                search_term: term.to_string(),
                ..Default::default()
            };
            names(&filter(&resources, &state))
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        };
        assert_eq!(by("BANNER"), vec!["Banner v1"]);
        assert_eq!(by("northwind"), vec!["Spot 30s"]);
        assert_eq!(by("carla"), vec!["Pitch deck"]);
        assert_eq!(by("luis"), vec!["Spot 30s"]);
        assert_eq!(by("acme").len(), 3);
    }

    #[test]
    fn test_categorical_filters_are_anded() {
        let resources = catalogue();
        let state = FilterState {
            search_term: String::new(),
            status: Some(ReviewStatus::PendingReview),
            resource_type: Some(ResourceType::Video),
        };
        assert_eq!(names(&filter(&resources, &state)), vec!["Spot 30s"]);

        let state = FilterState {
            status: Some(ReviewStatus::Rejected),
            resource_type: Some(ResourceType::Video),
            ..Default::default()
        };
        assert!(filter(&resources, &state).is_empty());
    }

    #[test]
    fn test_parse_query_string() {
        let state: FilterState = "?status=rejected&type=image&q=spring+banner&page=2"
            .parse()
            .unwrap();
        assert_eq!(state.status, Some(ReviewStatus::Rejected));
        assert_eq!(state.resource_type, Some(ResourceType::Image));
        assert_eq!(state.search_term, "spring banner");

        let wildcard: FilterState = "status=&type=".parse().unwrap();
        assert!(wildcard.is_empty());

        assert!("status=maybe".parse::<FilterState>().is_err());
    }
}
