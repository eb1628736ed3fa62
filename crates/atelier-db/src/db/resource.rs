use async_trait::async_trait;
use atelier_core::models::{Resource, ResourceDraft, ResourceUpdate};
use atelier_core::RepositoryError;
use sqlx::{PgPool, Postgres};
use std::collections::HashMap;
use uuid::Uuid;

use super::DocumentRow;
use crate::legacy::{self, BrandDisplay};
use crate::repository::ResourceRepository;

#[derive(Clone)]
pub struct PgResourceRepository {
    pool: PgPool,
}

impl PgResourceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn brand_directory(&self) -> Result<HashMap<Uuid, BrandDisplay>, RepositoryError> {
        let rows = sqlx::query_as::<Postgres, DocumentRow>(
            "SELECT id, data, created_at FROM brands",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut brands = HashMap::with_capacity(rows.len());
        for row in rows {
            match legacy::normalize_brand(row.id, &row.data) {
                Ok(brand) => {
                    brands.insert(row.id, brand);
                }
                Err(e) => tracing::warn!(brand_id = %row.id, error = %e, "Skipping unreadable brand"),
            }
        }
        Ok(brands)
    }

    async fn brand(&self, id: Uuid) -> Result<Option<BrandDisplay>, RepositoryError> {
        let row = sqlx::query_as::<Postgres, DocumentRow>(
            "SELECT id, data, created_at FROM brands WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(|row| legacy::normalize_brand(row.id, &row.data).ok()))
    }

    async fn to_resource(&self, row: DocumentRow) -> Result<Resource, RepositoryError> {
        let mut resource = legacy::normalize_resource(row.id, &row.data, row.created_at)?;
        if let Some(brand_id) = resource.brand_id {
            if let Some(brand) = self.brand(brand_id).await? {
                attach_brand(&mut resource, &brand);
            }
        }
        Ok(resource)
    }
}

fn attach_brand(resource: &mut Resource, brand: &BrandDisplay) {
    resource.brand_name = brand.name.clone();
    resource.client_name = brand.client_name.clone();
}

#[async_trait]
impl ResourceRepository for PgResourceRepository {
    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "resources",
        db.operation = "select"
    ))]
    async fn list(&self) -> Result<Vec<Resource>, RepositoryError> {
        let rows = sqlx::query_as::<Postgres, DocumentRow>(
            r#"
            SELECT id, data, created_at
            FROM resources
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, "Failed to list resources");
            RepositoryError::from(e)
        })?;

        let brands = self.brand_directory().await?;

        let mut resources = Vec::with_capacity(rows.len());
        for row in rows {
            match legacy::normalize_resource(row.id, &row.data, row.created_at) {
                Ok(mut resource) => {
                    if let Some(brand) = resource.brand_id.and_then(|id| brands.get(&id)) {
                        attach_brand(&mut resource, brand);
                    }
                    resources.push(resource);
                }
                Err(e) => {
                    tracing::warn!(resource_id = %row.id, error = %e, "Skipping unreadable resource")
                }
            }
        }

        tracing::debug!(count = resources.len(), "Resources loaded");
        Ok(resources)
    }

    #[tracing::instrument(skip(self, draft), fields(
        db.system = "postgresql",
        db.table = "resources",
        db.operation = "insert",
        resource.name = %draft.name
    ))]
    async fn create(&self, draft: ResourceDraft) -> Result<Resource, RepositoryError> {
        let id = Uuid::new_v4();
        let document = legacy::resource_document(&draft);

        let row = sqlx::query_as::<Postgres, DocumentRow>(
            r#"
            INSERT INTO resources (id, data)
            VALUES ($1, $2)
            RETURNING id, data, created_at
            "#,
        )
        .bind(id)
        .bind(&document)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, "Failed to insert resource");
            RepositoryError::from(e)
        })?;

        self.to_resource(row).await
    }

    #[tracing::instrument(skip(self, update), fields(
        db.system = "postgresql",
        db.table = "resources",
        db.operation = "update",
        resource.id = %id
    ))]
    async fn update(&self, id: Uuid, update: ResourceUpdate) -> Result<Resource, RepositoryError> {
        let patch = legacy::update_patch(&update);

        let row = sqlx::query_as::<Postgres, DocumentRow>(
            r#"
            UPDATE resources
            SET data = data || $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, data, created_at
            "#,
        )
        .bind(id)
        .bind(&patch)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, "Failed to update resource");
            RepositoryError::from(e)
        })?
        .ok_or_else(|| RepositoryError::new(format!("Resource {} not found", id)))?;

        self.to_resource(row).await
    }
}
