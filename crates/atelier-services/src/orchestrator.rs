//! Workflow orchestrator: one coherent operation per user action.
//!
//! Each operation checks the caller, runs the pure rules, issues the implied
//! repository calls in a fixed order and reloads the resource cache after a
//! successful write. Validation and authorization failures happen before any
//! repository call.

use atelier_core::models::{PendingStep, Resource, ReviewStatus, Task, TaskDraft, UploadDescriptor};
use atelier_core::config::MAX_UPLOAD_BATCH;
use atelier_core::{
    Actor, CapabilityCheck, ErrorMetadata, LogLevel, WorkflowConfig, WorkflowError,
};
use atelier_db::{ResourceRepository, TaskRepository};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::cache::ResourceCache;
use crate::filter::FilterState;
use crate::{linker, remedial, review};

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub max_upload_batch: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_upload_batch: MAX_UPLOAD_BATCH,
        }
    }
}

impl From<&WorkflowConfig> for OrchestratorSettings {
    fn from(config: &WorkflowConfig) -> Self {
        Self {
            max_upload_batch: config.max_upload_batch,
        }
    }
}

/// Task a resource should be linked to.
#[derive(Debug, Clone)]
pub enum LinkTarget {
    Existing(Uuid),
    New(TaskDraft),
}

#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub resource: Resource,
    /// Created for negative outcomes only.
    pub remedial_task: Option<Task>,
}

#[derive(Debug, Clone)]
pub struct LinkOutcome {
    pub resource: Resource,
    pub task_id: Uuid,
    pub created_task: Option<Task>,
    /// False when the resource already referenced the task.
    pub changed: bool,
}

#[derive(Debug)]
pub enum UploadItemOutcome {
    Created {
        index: usize,
        resource: Resource,
    },
    Failed {
        index: usize,
        name: String,
        error: WorkflowError,
    },
}

impl UploadItemOutcome {
    pub fn index(&self) -> usize {
        match self {
            UploadItemOutcome::Created { index, .. } | UploadItemOutcome::Failed { index, .. } => {
                *index
            }
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, UploadItemOutcome::Created { .. })
    }
}

/// Per-item results of `record_upload`, in input order.
#[derive(Debug, Default)]
pub struct BatchUploadReport {
    pub items: Vec<UploadItemOutcome>,
}

impl BatchUploadReport {
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.is_created()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }

    pub fn created(&self) -> impl Iterator<Item = &Resource> {
        self.items.iter().filter_map(|i| match i {
            UploadItemOutcome::Created { resource, .. } => Some(resource),
            UploadItemOutcome::Failed { .. } => None,
        })
    }
}

/// What a successful `retry_pending` completed.
#[derive(Debug, Clone)]
pub enum RetryOutcome {
    RemedialTaskCreated(Task),
    Linked(Resource),
}

pub struct WorkflowOrchestrator {
    resources: Arc<dyn ResourceRepository>,
    tasks: Arc<dyn TaskRepository>,
    capabilities: Arc<dyn CapabilityCheck>,
    cache: Arc<ResourceCache>,
    settings: OrchestratorSettings,
}

impl WorkflowOrchestrator {
    pub fn new(
        resources: Arc<dyn ResourceRepository>,
        tasks: Arc<dyn TaskRepository>,
        capabilities: Arc<dyn CapabilityCheck>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            resources,
            tasks,
            capabilities,
            cache: Arc::new(ResourceCache::new()),
            settings,
        }
    }

    pub async fn snapshot(&self) -> Arc<[Resource]> {
        self.cache.snapshot().await
    }

    /// Reload the cache from the repository.
    pub async fn refresh(&self) -> Result<usize, WorkflowError> {
        Ok(self.cache.reload(self.resources.as_ref()).await?)
    }

    /// Resources in the current snapshot matching `state`, in snapshot order.
    ///
    /// Reads only the in-memory snapshot, so there is no error case; an empty
    /// cache yields an empty list.
    pub async fn get_filtered(&self, state: &FilterState) -> Vec<Resource> {
        let snapshot = self.cache.snapshot().await;
        crate::filter::filter(&snapshot, state)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Record a review decision and, for negative outcomes, create the
    /// remedial task for the uploader.
    #[tracing::instrument(skip(self, actor, observations), fields(resource_id = %resource_id, target = %target))]
    pub async fn submit_review(
        &self,
        resource_id: Uuid,
        target: ReviewStatus,
        actor: &Actor,
        observations: &str,
    ) -> Result<ReviewOutcome, WorkflowError> {
        let reviewer = self.authorize(actor, Capability::Review)?;
        let resource = self.find_resource(resource_id).await?;
        let now = Utc::now();

        let transition = review::apply_transition(&resource, target, reviewer, observations, now)?;
        let remedial_draft = if transition.requires_remedial_task {
            Some(remedial::generate(&resource, observations, target, now)?)
        } else {
            None
        };

        let updated = self
            .resources
            .update(resource_id, transition.update)
            .await
            .map_err(|e| self.log_failure(WorkflowError::from(e)))?;
        tracing::info!(reviewer, status = %updated.status, "Review recorded");

        let remedial_task = match remedial_draft {
            Some(draft) => match self.tasks.create(draft.clone()).await {
                Ok(task) => {
                    tracing::info!(task_id = %task.id, assignee = ?task.assignee, "Remedial task created");
                    Some(task)
                }
                Err(source) => {
                    self.reload_after_write().await;
                    let pending = PendingStep::RemedialTask { resource_id, draft };
                    return Err(self.log_failure(WorkflowError::partial(updated, pending, source)));
                }
            },
            None => None,
        };

        self.reload_after_write().await;
        Ok(ReviewOutcome {
            resource: updated,
            remedial_task,
        })
    }

    /// Link a resource to an existing task or to one created for it.
    #[tracing::instrument(skip(self, target, actor), fields(resource_id = %resource_id))]
    pub async fn link_resource(
        &self,
        resource_id: Uuid,
        target: LinkTarget,
        actor: &Actor,
    ) -> Result<LinkOutcome, WorkflowError> {
        self.authorize(actor, Capability::Assign)?;
        let resource = self.fresh_resource(resource_id).await?;

        let (task_id, created_task, update) = match target {
            LinkTarget::Existing(task_id) => {
                (task_id, None, linker::link_to_existing(&resource, task_id))
            }
            LinkTarget::New(draft) => {
                let (task, update) =
                    linker::link_to_new_task(&resource, draft, self.tasks.as_ref())
                        .await
                        .map_err(|e| self.log_failure(e))?;
                tracing::info!(task_id = %task.id, "Task created for link");
                (task.id, Some(task), update)
            }
        };

        if update.is_empty() {
            tracing::debug!(task_id = %task_id, "Resource already linked; nothing to write");
            return Ok(LinkOutcome {
                resource,
                task_id,
                created_task,
                changed: false,
            });
        }

        let linked = match self.resources.update(resource_id, update).await {
            Ok(linked) => linked,
            Err(source) => {
                let error = match created_task {
                    Some(task) => WorkflowError::partial(
                        resource,
                        PendingStep::ResourceLink { resource_id, task },
                        source,
                    ),
                    None => WorkflowError::from(source),
                };
                return Err(self.log_failure(error));
            }
        };
        tracing::info!(task_id = %task_id, related = linked.related_tasks.len(), "Resource linked");

        self.reload_after_write().await;
        Ok(LinkOutcome {
            resource: linked,
            task_id,
            created_task,
            changed: true,
        })
    }

    /// Create one pending-review resource per descriptor. Items are
    /// independent; a failure is reported for that item only.
    #[tracing::instrument(skip(self, descriptors), fields(batch_size = descriptors.len()))]
    pub async fn record_upload(
        &self,
        descriptors: Vec<UploadDescriptor>,
        uploader: &str,
    ) -> Result<BatchUploadReport, WorkflowError> {
        let uploader = uploader.trim();
        if uploader.is_empty() {
            return Err(WorkflowError::Unauthorized(
                "An uploader identity is required to record uploads".to_string(),
            ));
        }
        if descriptors.len() > self.settings.max_upload_batch {
            return Err(WorkflowError::Validation(format!(
                "Upload batch of {} exceeds the maximum of {}",
                descriptors.len(),
                self.settings.max_upload_batch
            )));
        }

        let now = Utc::now();
        let mut report = BatchUploadReport::default();
        for (index, descriptor) in descriptors.into_iter().enumerate() {
            let name = descriptor.name.clone();
            let outcome = match self.create_uploaded(descriptor, uploader, now).await {
                Ok(resource) => UploadItemOutcome::Created { index, resource },
                Err(error) => {
                    tracing::warn!(index, name = %name, error = %error, "Upload item not recorded");
                    UploadItemOutcome::Failed { index, name, error }
                }
            };
            report.items.push(outcome);
        }

        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Upload batch recorded"
        );
        if report.succeeded() > 0 {
            self.reload_after_write().await;
        }
        Ok(report)
    }

    /// Re-issue only the step a partial failure left undone.
    #[tracing::instrument(skip(self, step, actor), fields(resource_id = %step.resource_id()))]
    pub async fn retry_pending(
        &self,
        step: PendingStep,
        actor: &Actor,
    ) -> Result<RetryOutcome, WorkflowError> {
        match step {
            PendingStep::RemedialTask { draft, .. } => {
                self.authorize(actor, Capability::Review)?;
                let task = self
                    .tasks
                    .create(draft)
                    .await
                    .map_err(|e| self.log_failure(WorkflowError::from(e)))?;
                tracing::info!(task_id = %task.id, "Remedial task created on retry");
                self.reload_after_write().await;
                Ok(RetryOutcome::RemedialTaskCreated(task))
            }
            PendingStep::ResourceLink { resource_id, task } => {
                self.authorize(actor, Capability::Assign)?;
                let resource = self.fresh_resource(resource_id).await?;
                let update = linker::link_to_existing(&resource, task.id);
                if update.is_empty() {
                    return Ok(RetryOutcome::Linked(resource));
                }
                let linked = self
                    .resources
                    .update(resource_id, update)
                    .await
                    .map_err(|e| self.log_failure(WorkflowError::from(e)))?;
                self.reload_after_write().await;
                Ok(RetryOutcome::Linked(linked))
            }
        }
    }

    async fn create_uploaded(
        &self,
        descriptor: UploadDescriptor,
        uploader: &str,
        now: DateTime<Utc>,
    ) -> Result<Resource, WorkflowError> {
        descriptor.validate()?;
        if descriptor.name.trim().is_empty() {
            return Err(WorkflowError::Validation("name: must not be blank".to_string()));
        }
        Ok(self
            .resources
            .create(descriptor.into_draft(uploader, now))
            .await?)
    }

    fn authorize<'a>(
        &self,
        actor: &'a Actor,
        capability: Capability,
    ) -> Result<&'a str, WorkflowError> {
        let identity = actor.identity().ok_or_else(|| {
            WorkflowError::Unauthorized("A caller identity is required".to_string())
        })?;
        let allowed = match capability {
            Capability::Review => self.capabilities.can_review(&actor.role),
            Capability::Assign => self.capabilities.can_assign(&actor.role),
        };
        if !allowed {
            tracing::debug!(identity, role = %actor.role, ?capability, "Capability check failed");
            return Err(WorkflowError::Unauthorized(format!(
                "Role '{}' may not {}",
                actor.role,
                capability.verb()
            )));
        }
        Ok(identity)
    }

    /// Resource from the snapshot, reloading once on a miss.
    async fn find_resource(&self, id: Uuid) -> Result<Resource, WorkflowError> {
        if let Some(resource) = self.cache.find(id).await {
            return Ok(resource);
        }
        self.refresh().await?;
        self.cache
            .find(id)
            .await
            .ok_or_else(|| WorkflowError::NotFound(format!("Resource {} not found", id)))
    }

    /// Resource as currently stored. Link updates replace `related_tasks`
    /// wholesale, so they must start from a fresh list rather than the
    /// snapshot, which may be stale after a failed reload.
    async fn fresh_resource(&self, id: Uuid) -> Result<Resource, WorkflowError> {
        self.refresh().await.map_err(|e| self.log_failure(e))?;
        self.cache
            .find(id)
            .await
            .ok_or_else(|| WorkflowError::NotFound(format!("Resource {} not found", id)))
    }

    async fn reload_after_write(&self) {
        if let Err(e) = self.cache.reload(self.resources.as_ref()).await {
            tracing::warn!(error = %e, "Cache reload failed after write; keeping previous snapshot");
        }
    }

    fn log_failure(&self, error: WorkflowError) -> WorkflowError {
        match error.log_level() {
            LogLevel::Error => {
                tracing::error!(error = %error, code = error.error_code(), "Workflow operation failed")
            }
            LogLevel::Warn => {
                tracing::warn!(error = %error, code = error.error_code(), "Workflow operation incomplete")
            }
            _ => tracing::debug!(error = %error, code = error.error_code(), "Workflow operation rejected"),
        }
        error
    }
}

#[derive(Debug, Clone, Copy)]
enum Capability {
    Review,
    Assign,
}

impl Capability {
    fn verb(self) -> &'static str {
        match self {
            Capability::Review => "review resources",
            Capability::Assign => "assign resources to tasks",
        }
    }
}
