//! Resource to task linking

use atelier_core::models::{Resource, ResourceUpdate, Task, TaskDraft};
use atelier_core::WorkflowError;
use atelier_db::TaskRepository;
use uuid::Uuid;

/// Update that links `resource` to `task_id`.
///
/// Appends the task if absent and makes it primary when there is none. A
/// primary task missing from `related_tasks` is put back at the front. The
/// update is empty when the resource already satisfies all of this.
pub fn link_to_existing(resource: &Resource, task_id: Uuid) -> ResourceUpdate {
    let mut update = ResourceUpdate::default();
    let primary = match resource.task_id {
        Some(primary) => primary,
        None => {
            update.task_id = Some(task_id);
            task_id
        }
    };

    if resource.is_linked_to(primary) && resource.is_linked_to(task_id) {
        return update;
    }
    let mut related = resource.related_tasks.clone();
    if !resource.is_linked_to(primary) {
        related.insert(0, primary);
    }
    if primary != task_id && !resource.is_linked_to(task_id) {
        related.push(task_id);
    }
    update.related_tasks = Some(related);
    update
}

/// Create a task for `resource` and build the update linking to it.
///
/// Nothing is written to the resource here; a failed creation leaves it as is.
pub async fn link_to_new_task(
    resource: &Resource,
    mut draft: TaskDraft,
    tasks: &dyn TaskRepository,
) -> Result<(Task, ResourceUpdate), WorkflowError> {
    if draft.related_resource_id.is_none() {
        draft.related_resource_id = Some(resource.id);
    }
    let task = tasks.create(draft).await?;
    let update = link_to_existing(resource, task.id);
    Ok((task, update))
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::models::{TaskPriority, TaskStatus};
    use atelier_db::test_helpers::{fixed_now, sample_resource, MockTaskRepository};

    fn draft(title: &str) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            description: String::new(),
            brand_id: None,
            status: TaskStatus::Pending,
            priority: TaskPriority::Normal,
            assignee: None,
            due_date: fixed_now(),
            related_resource_id: None,
        }
    }

    #[test]
    fn test_first_link_sets_primary() {
        let resource = sample_resource("Banner v1", Some("ana"));
        let t1 = Uuid::new_v4();
        let update = link_to_existing(&resource, t1);
        assert_eq!(update.task_id, Some(t1));
        assert_eq!(update.related_tasks, Some(vec![t1]));
    }

    #[test]
    fn test_linking_is_idempotent() {
        let resource = sample_resource("Banner v1", Some("ana"));
        let t1 = Uuid::new_v4();
        let once = link_to_existing(&resource, t1).apply_to(&resource);
        let second = link_to_existing(&once, t1);
        assert!(second.is_empty());
        assert_eq!(second.apply_to(&once).related_tasks, once.related_tasks);
    }

    #[test]
    fn test_additional_link_keeps_primary() {
        let mut resource = sample_resource("Banner v1", Some("ana"));
        let (t1, t2) = (Uuid::new_v4(), Uuid::new_v4());
        resource.task_id = Some(t1);
        resource.related_tasks = vec![t1];

        let update = link_to_existing(&resource, t2);
        assert_eq!(update.task_id, None);
        assert_eq!(update.related_tasks, Some(vec![t1, t2]));
    }

    #[test]
    fn test_missing_primary_is_repaired() {
        let mut resource = sample_resource("Banner v1", Some("ana"));
        let (primary, other) = (Uuid::new_v4(), Uuid::new_v4());
        resource.task_id = Some(primary);
        resource.related_tasks = vec![other];

        let update = link_to_existing(&resource, other);
        assert_eq!(update.related_tasks, Some(vec![primary, other]));
    }

    #[tokio::test]
    async fn test_link_to_new_task_sets_back_reference() {
        let resource = sample_resource("Banner v1", Some("ana"));
        let tasks = MockTaskRepository::new();

        let (task, update) = link_to_new_task(&resource, draft("Adapt for stories"), &tasks)
            .await
            .unwrap();
        assert_eq!(task.related_resource_id, Some(resource.id));
        assert_eq!(update.related_tasks, Some(vec![task.id]));
        assert_eq!(tasks.create_calls(), 1);
    }

    #[tokio::test]
    async fn test_link_to_new_task_propagates_creation_failure() {
        let resource = sample_resource("Banner v1", Some("ana"));
        let tasks = MockTaskRepository::new();
        tasks.fail_creates(true);

        let err = link_to_new_task(&resource, draft("Adapt"), &tasks)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Repository(_)));
    }
}
