//! Error types module
//!
//! `RepositoryError` is what the persistence adapters return. `WorkflowError`
//! is what every orchestrated operation resolves to on failure; its `kind()`
//! is the discriminant the presentation layer switches on.
//!
//! `From<sqlx::Error>` is gated behind the `sqlx` feature.

use std::fmt;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;
use uuid::Uuid;

use crate::models::{PendingStep, Resource};

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented and handled.
pub trait ErrorMetadata {
    /// Broad category of the error.
    fn kind(&self) -> ErrorKind;

    /// Machine-readable error code (e.g., "REPOSITORY_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same call may succeed
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the caller
    fn suggested_action(&self) -> Option<&'static str>;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Failure reported by a repository adapter. Carries a human-readable message.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct RepositoryError {
    message: String,
    #[source]
    source: Option<anyhow::Error>,
}

impl RepositoryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        RepositoryError::with_source(format!("Database error: {}", err), err)
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::with_source(format!("Malformed stored document: {}", err), err)
    }
}

/// Category of a workflow failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Unauthorized,
    Repository,
    PartialFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Repository => "repository",
            ErrorKind::PartialFailure => "partial_failure",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Resource {resource_id} has no uploader to assign the remedial task to")]
    MissingUploader { resource_id: Uuid },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// The primary step was persisted; the dependent step was not.
    #[error("Partial failure on resource {}: {}", .resource.id, .pending.remediation_hint())]
    PartialFailure {
        resource: Box<Resource>,
        pending: Box<PendingStep>,
        #[source]
        source: RepositoryError,
    },
}

impl WorkflowError {
    pub fn partial(resource: Resource, pending: PendingStep, source: RepositoryError) -> Self {
        WorkflowError::PartialFailure {
            resource: Box::new(resource),
            pending: Box::new(pending),
            source,
        }
    }

    /// Step to hand back to the orchestrator, for partial failures only.
    pub fn pending_step(&self) -> Option<&PendingStep> {
        match self {
            WorkflowError::PartialFailure { pending, .. } => Some(pending.as_ref()),
            _ => None,
        }
    }
}

impl From<validator::ValidationErrors> for WorkflowError {
    fn from(err: validator::ValidationErrors) -> Self {
        WorkflowError::Validation(format!("Validation error: {}", err))
    }
}

/// Static metadata for each variant: (kind, error_code, recoverable, suggested_action, log_level).
fn workflow_error_static_metadata(
    err: &WorkflowError,
) -> (ErrorKind, &'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        WorkflowError::Validation(_) => (
            ErrorKind::Validation,
            "VALIDATION_ERROR",
            false,
            Some("Check the submitted fields and try again"),
            LogLevel::Debug,
        ),
        WorkflowError::MissingUploader { .. } => (
            ErrorKind::Validation,
            "MISSING_UPLOADER",
            false,
            Some("Set the resource's uploader before rejecting it"),
            LogLevel::Warn,
        ),
        WorkflowError::NotFound(_) => (
            ErrorKind::NotFound,
            "NOT_FOUND",
            false,
            Some("Refresh the resource list; it may have been removed"),
            LogLevel::Debug,
        ),
        WorkflowError::Unauthorized(_) => (
            ErrorKind::Unauthorized,
            "UNAUTHORIZED",
            false,
            Some("Sign in with a role allowed to perform this action"),
            LogLevel::Debug,
        ),
        WorkflowError::Repository(_) => (
            ErrorKind::Repository,
            "REPOSITORY_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
        WorkflowError::PartialFailure { .. } => (
            ErrorKind::PartialFailure,
            "PARTIAL_FAILURE",
            true,
            Some("Retry only the pending step"),
            LogLevel::Warn,
        ),
    }
}

impl ErrorMetadata for WorkflowError {
    fn kind(&self) -> ErrorKind {
        workflow_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        workflow_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        workflow_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        match self {
            WorkflowError::PartialFailure { pending, .. } => Some(pending.remediation_hint()),
            _ => workflow_error_static_metadata(self).3,
        }
    }

    fn log_level(&self) -> LogLevel {
        workflow_error_static_metadata(self).4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReviewStatus, ResourceType, TaskDraft, TaskPriority, TaskStatus};
    use chrono::Utc;
    use std::collections::BTreeSet;

    fn sample_resource() -> Resource {
        Resource {
            id: Uuid::new_v4(),
            name: "Banner v1".to_string(),
            description: String::new(),
            resource_type: ResourceType::Image,
            category: String::new(),
            tags: BTreeSet::new(),
            brand_id: None,
            brand_name: None,
            client_name: None,
            task_id: None,
            related_tasks: Vec::new(),
            submitted_by: Some("ana".to_string()),
            uploaded_at: Utc::now(),
            status: ReviewStatus::Rejected,
            review: None,
            url: None,
        }
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            WorkflowError::Validation("x".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            WorkflowError::MissingUploader {
                resource_id: Uuid::new_v4()
            }
            .kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            WorkflowError::Unauthorized("x".into()).kind(),
            ErrorKind::Unauthorized
        );
        assert_eq!(
            WorkflowError::from(RepositoryError::new("boom")).kind(),
            ErrorKind::Repository
        );
    }

    #[test]
    fn test_partial_failure_exposes_pending_step() {
        let resource = sample_resource();
        let pending = PendingStep::RemedialTask {
            resource_id: resource.id,
            draft: TaskDraft {
                title: "t".to_string(),
                description: "d".to_string(),
                brand_id: None,
                status: TaskStatus::AttentionRequired,
                priority: TaskPriority::Urgent,
                assignee: Some("ana".to_string()),
                due_date: Utc::now(),
                related_resource_id: Some(resource.id),
            },
        };
        let err = WorkflowError::partial(resource, pending.clone(), RepositoryError::new("down"));

        assert_eq!(err.kind(), ErrorKind::PartialFailure);
        assert!(err.is_recoverable());
        assert_eq!(err.pending_step(), Some(&pending));
        assert_eq!(err.suggested_action(), Some(pending.remediation_hint()));
        assert!(err.to_string().contains("remedial task was not created"));
    }

    #[test]
    fn test_repository_error_keeps_message() {
        let err = RepositoryError::with_source("insert failed", anyhow::anyhow!("timeout"));
        assert_eq!(err.message(), "insert failed");
        assert_eq!(err.to_string(), "insert failed");
        assert!(std::error::Error::source(&err).is_some());
    }
}
