use async_trait::async_trait;
use atelier_core::models::{Task, TaskDraft};
use atelier_core::RepositoryError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::DocumentRow;
use crate::legacy;
use crate::repository::TaskRepository;

#[derive(Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    #[tracing::instrument(skip(self, draft), fields(
        db.system = "postgresql",
        db.table = "tasks",
        db.operation = "insert",
        task.title = %draft.title
    ))]
    async fn create(&self, draft: TaskDraft) -> Result<Task, RepositoryError> {
        let id = Uuid::new_v4();
        let document = legacy::task_document(&draft);

        let row = sqlx::query_as::<Postgres, DocumentRow>(
            r#"
            INSERT INTO tasks (id, data)
            VALUES ($1, $2)
            RETURNING id, data, created_at
            "#,
        )
        .bind(id)
        .bind(&document)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, "Failed to insert task");
            RepositoryError::from(e)
        })?;

        legacy::normalize_task(row.id, &row.data, row.created_at)
    }
}
