//! Mock repository implementations for testing
//!
//! Every call is counted, including failed ones, so tests can assert how
//! many persistence calls an operation made.

use async_trait::async_trait;
use atelier_core::models::{Resource, ResourceDraft, ResourceUpdate, Task, TaskDraft};
use atelier_core::RepositoryError;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::repository::{ResourceRepository, TaskRepository};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list: usize,
    pub create: usize,
    pub update: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.list + self.create + self.update
    }
}

#[derive(Debug, Default)]
struct ResourceFailures {
    /// 1-based numbers of `create` calls that fail.
    create_calls: HashSet<usize>,
    updates: bool,
    lists: bool,
}

/// Mock resource repository for testing without database
#[derive(Clone, Default)]
pub struct MockResourceRepository {
    resources: Arc<Mutex<Vec<Resource>>>,
    calls: Arc<Mutex<CallCounts>>,
    failures: Arc<Mutex<ResourceFailures>>,
}

impl MockResourceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resources(resources: Vec<Resource>) -> Self {
        let repo = Self::new();
        *repo.resources.lock().unwrap() = resources;
        repo
    }

    pub fn insert(&self, resource: Resource) {
        self.resources.lock().unwrap().push(resource);
    }

    pub fn get(&self, id: Uuid) -> Option<Resource> {
        self.resources
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    pub fn resources(&self) -> Vec<Resource> {
        self.resources.lock().unwrap().clone()
    }

    pub fn calls(&self) -> CallCounts {
        *self.calls.lock().unwrap()
    }

    /// Make the `n`-th `create` call (1-based) fail.
    pub fn fail_create_call(&self, n: usize) {
        self.failures.lock().unwrap().create_calls.insert(n);
    }

    pub fn fail_updates(&self, fail: bool) {
        self.failures.lock().unwrap().updates = fail;
    }

    pub fn fail_lists(&self, fail: bool) {
        self.failures.lock().unwrap().lists = fail;
    }
}

#[async_trait]
impl ResourceRepository for MockResourceRepository {
    async fn list(&self) -> Result<Vec<Resource>, RepositoryError> {
        self.calls.lock().unwrap().list += 1;
        if self.failures.lock().unwrap().lists {
            return Err(RepositoryError::new("list unavailable"));
        }
        Ok(self.resources())
    }

    async fn create(&self, draft: ResourceDraft) -> Result<Resource, RepositoryError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.create += 1;
            calls.create
        };
        if self.failures.lock().unwrap().create_calls.contains(&call) {
            return Err(RepositoryError::new(format!("create call {} rejected", call)));
        }

        let resource = Resource {
            id: Uuid::new_v4(),
            name: draft.name,
            description: draft.description,
            resource_type: draft.resource_type,
            category: draft.category,
            tags: draft.tags,
            brand_id: draft.brand_id,
            brand_name: None,
            client_name: None,
            task_id: draft.task_id,
            related_tasks: draft.related_tasks,
            submitted_by: draft.submitted_by,
            uploaded_at: draft.uploaded_at,
            status: draft.status,
            review: None,
            url: draft.url,
        };
        self.insert(resource.clone());
        Ok(resource)
    }

    async fn update(&self, id: Uuid, update: ResourceUpdate) -> Result<Resource, RepositoryError> {
        self.calls.lock().unwrap().update += 1;
        if self.failures.lock().unwrap().updates {
            return Err(RepositoryError::new("update unavailable"));
        }

        let mut resources = self.resources.lock().unwrap();
        let slot = resources
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| RepositoryError::new(format!("Resource {} not found", id)))?;
        *slot = update.apply_to(slot);
        Ok(slot.clone())
    }
}

/// Mock task repository for testing without database
#[derive(Clone, Default)]
pub struct MockTaskRepository {
    tasks: Arc<Mutex<Vec<Task>>>,
    creates: Arc<Mutex<usize>>,
    fail_creates: Arc<Mutex<bool>>,
}

impl MockTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.lock().unwrap().clone()
    }

    pub fn create_calls(&self) -> usize {
        *self.creates.lock().unwrap()
    }

    pub fn fail_creates(&self, fail: bool) {
        *self.fail_creates.lock().unwrap() = fail;
    }
}

#[async_trait]
impl TaskRepository for MockTaskRepository {
    async fn create(&self, draft: TaskDraft) -> Result<Task, RepositoryError> {
        *self.creates.lock().unwrap() += 1;
        if *self.fail_creates.lock().unwrap() {
            return Err(RepositoryError::new("task service unavailable"));
        }

        let task = Task {
            id: Uuid::new_v4(),
            title: draft.title,
            description: draft.description,
            brand_id: draft.brand_id,
            status: draft.status,
            priority: draft.priority,
            assignee: draft.assignee,
            due_date: draft.due_date,
            related_resource_id: draft.related_resource_id,
            created_at: Utc::now(),
        };
        self.tasks.lock().unwrap().push(task.clone());
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::fixtures::sample_resource;
    use atelier_core::models::ReviewStatus;

    #[tokio::test]
    async fn test_update_applies_and_counts() {
        let resource = sample_resource("Banner v1", Some("ana"));
        let repo = MockResourceRepository::with_resources(vec![resource.clone()]);

        let updated = repo
            .update(
                resource.id,
                ResourceUpdate {
                    status: Some(ReviewStatus::Approved),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, ReviewStatus::Approved);
        assert_eq!(repo.get(resource.id).unwrap().status, ReviewStatus::Approved);
        assert_eq!(repo.calls().update, 1);
    }

    #[tokio::test]
    async fn test_failures_are_still_counted() {
        let repo = MockResourceRepository::new();
        repo.fail_lists(true);
        assert!(repo.list().await.is_err());
        assert!(repo.update(Uuid::new_v4(), ResourceUpdate::default()).await.is_err());
        assert_eq!(repo.calls().total(), 2);
    }
}
