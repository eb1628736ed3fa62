//! Normalisation of stored documents into canonical domain models
//!
//! Documents in the backend were written by several generations of clients
//! and use different names for the same field (`submittedBy`, `uploadedBy`,
//! `subidoPor`, ...) as well as Spanish enumeration values (`rechazado`,
//! `urgente`). Reads accept every known variant; the canonical key wins when
//! present, even when it is `null`. Writes always use canonical keys.

use atelier_core::models::{
    Resource, ResourceDraft, ResourceType, ResourceUpdate, ReviewRecord, ReviewStatus, Task,
    TaskDraft, TaskPriority, TaskStatus,
};
use atelier_core::RepositoryError;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value as JsonValue};
use std::collections::BTreeSet;
use uuid::Uuid;

type Document = Map<String, JsonValue>;

/// Accepted key names per field, canonical first.
mod keys {
    pub const NAME: &[&str] = &["name", "nombre", "title", "fileName"];
    pub const DESCRIPTION: &[&str] = &["description", "descripcion"];
    pub const RESOURCE_TYPE: &[&str] = &["resource_type", "type", "tipo"];
    pub const CATEGORY: &[&str] = &["category", "categoria"];
    pub const TAGS: &[&str] = &["tags", "etiquetas"];
    pub const BRAND_ID: &[&str] = &["brand_id", "brandId", "marcaId"];
    pub const TASK_ID: &[&str] = &["task_id", "taskId", "tareaId"];
    pub const RELATED_TASKS: &[&str] = &["related_tasks", "relatedTasks", "tareasRelacionadas"];
    pub const SUBMITTED_BY: &[&str] = &["submitted_by", "submittedBy", "uploadedBy", "subidoPor"];
    pub const UPLOADED_AT: &[&str] = &["uploaded_at", "uploadedAt", "fechaSubida", "createdAt"];
    pub const STATUS: &[&str] = &["status", "estado"];
    pub const REVIEWED_BY: &[&str] = &["reviewed_by", "reviewedBy", "revisadoPor"];
    pub const REVIEWED_AT: &[&str] = &["reviewed_at", "reviewedAt", "fechaRevision"];
    pub const REVIEW_NOTES: &[&str] = &["review_notes", "reviewNotes", "observaciones"];
    pub const URL: &[&str] = &["url", "fileUrl", "downloadUrl", "enlace"];

    pub const TITLE: &[&str] = &["title", "titulo"];
    pub const PRIORITY: &[&str] = &["priority", "prioridad"];
    pub const ASSIGNEE: &[&str] = &["assignee", "asignadoA", "responsable"];
    pub const DUE_DATE: &[&str] = &["due_date", "dueDate", "fechaLimite"];
    pub const RELATED_RESOURCE: &[&str] =
        &["related_resource_id", "relatedResourceId", "recursoId"];

    pub const CLIENT_NAME: &[&str] = &["client_name", "clientName", "cliente"];
}

/// Display values of a brand, used to enrich resources for search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrandDisplay {
    pub name: Option<String>,
    pub client_name: Option<String>,
}

fn as_document(id: Uuid, data: &JsonValue, entity: &str) -> Result<Document, RepositoryError> {
    data.as_object()
        .cloned()
        .ok_or_else(|| RepositoryError::new(format!("{} {} is not a JSON object", entity, id)))
}

/// First key in `names` that is present, null included.
fn field<'a>(doc: &'a Document, names: &[&str]) -> Option<&'a JsonValue> {
    names.iter().find_map(|name| doc.get(*name))
}

/// Non-blank string value, returned unmodified.
fn string_field(doc: &Document, names: &[&str]) -> Option<String> {
    match field(doc, names)? {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn uuid_field(doc: &Document, names: &[&str]) -> Option<Uuid> {
    string_field(doc, names).and_then(|s| Uuid::parse_str(s.trim()).ok())
}

/// RFC 3339 strings, or epoch milliseconds as written by older web clients.
fn timestamp_field(doc: &Document, names: &[&str]) -> Option<DateTime<Utc>> {
    match field(doc, names)? {
        JsonValue::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        v @ JsonValue::String(_) => serde_json::from_value(v.clone()).ok(),
        _ => None,
    }
}

/// Array of ids in stored order, duplicates and unparseable entries dropped.
fn uuid_list_field(doc: &Document, names: &[&str]) -> Vec<Uuid> {
    let mut ids = Vec::new();
    if let Some(JsonValue::Array(items)) = field(doc, names) {
        for item in items {
            match item.as_str().map(|s| Uuid::parse_str(s.trim())) {
                Some(Ok(id)) if !ids.contains(&id) => ids.push(id),
                Some(Ok(_)) => {}
                _ => tracing::warn!(value = %item, "Skipping unparseable task id"),
            }
        }
    }
    ids
}

/// Array of strings or a single comma-separated string.
fn tags_field(doc: &Document, names: &[&str]) -> BTreeSet<String> {
    let raw: Vec<String> = match field(doc, names) {
        Some(JsonValue::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(JsonValue::String(s)) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };
    raw.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

pub fn parse_review_status(raw: &str) -> Option<ReviewStatus> {
    let value = raw.trim().to_lowercase();
    if let Ok(status) = value.parse() {
        return Some(status);
    }
    match value.as_str() {
        "pending" | "pendiente" | "pendiente_revision" | "por_revisar" => {
            Some(ReviewStatus::PendingReview)
        }
        "aprobado" | "aprobada" => Some(ReviewStatus::Approved),
        "revision" | "en_revision" | "requiere_revision" | "review" => {
            Some(ReviewStatus::NeedsReview)
        }
        "rechazado" | "rechazada" => Some(ReviewStatus::Rejected),
        _ => None,
    }
}

pub fn parse_resource_type(raw: &str) -> ResourceType {
    let value = raw.trim().to_lowercase();
    if let Ok(kind) = value.parse() {
        return kind;
    }
    match value.as_str() {
        "imagen" => ResourceType::Image,
        "documento" | "pdf" => ResourceType::Document,
        "archivo" | "zip" => ResourceType::Archive,
        "enlace" | "link" => ResourceType::Url,
        mime if mime.starts_with("image/") => ResourceType::Image,
        mime if mime.starts_with("video/") => ResourceType::Video,
        mime if mime.starts_with("audio/") => ResourceType::Audio,
        "application/zip" | "application/x-rar-compressed" | "application/x-7z-compressed" => {
            ResourceType::Archive
        }
        mime if mime.starts_with("application/") || mime.starts_with("text/") => {
            ResourceType::Document
        }
        _ => ResourceType::Unknown,
    }
}

pub fn parse_task_status(raw: &str) -> Option<TaskStatus> {
    let value = raw.trim().to_lowercase();
    if let Ok(status) = value.parse() {
        return Some(status);
    }
    match value.as_str() {
        "pendiente" => Some(TaskStatus::Pending),
        "en_progreso" | "en_proceso" => Some(TaskStatus::InProgress),
        "requiere_atencion" | "atencion" => Some(TaskStatus::AttentionRequired),
        "completada" | "completado" | "done" => Some(TaskStatus::Completed),
        _ => None,
    }
}

pub fn parse_task_priority(raw: &str) -> Option<TaskPriority> {
    let value = raw.trim().to_lowercase();
    if let Ok(priority) = value.parse() {
        return Some(priority);
    }
    match value.as_str() {
        "baja" => Some(TaskPriority::Low),
        "media" => Some(TaskPriority::Normal),
        "alta" => Some(TaskPriority::High),
        "urgente" => Some(TaskPriority::Urgent),
        _ => None,
    }
}

/// Build a canonical `Resource` from a stored document.
///
/// `stored_at` is the row creation time, used when the document has no
/// upload timestamp. Brand display names are filled in by the caller.
pub fn normalize_resource(
    id: Uuid,
    data: &JsonValue,
    stored_at: DateTime<Utc>,
) -> Result<Resource, RepositoryError> {
    let doc = as_document(id, data, "Resource")?;

    let status = match string_field(&doc, keys::STATUS) {
        Some(raw) => parse_review_status(&raw).unwrap_or_else(|| {
            tracing::warn!(resource_id = %id, status = %raw, "Unknown review status, treating as pending");
            ReviewStatus::PendingReview
        }),
        None => ReviewStatus::PendingReview,
    };

    let review = match (
        string_field(&doc, keys::REVIEWED_BY),
        timestamp_field(&doc, keys::REVIEWED_AT),
    ) {
        (Some(reviewed_by), Some(reviewed_at)) => Some(ReviewRecord {
            reviewed_by,
            reviewed_at,
            notes: string_field(&doc, keys::REVIEW_NOTES),
        }),
        (None, None) => None,
        _ => {
            tracing::warn!(resource_id = %id, "Dropping partial review metadata");
            None
        }
    };
    // Review metadata only exists for reviewed resources.
    let review = if status.is_initial() { None } else { review };

    let mut related_tasks = uuid_list_field(&doc, keys::RELATED_TASKS);
    let task_id = uuid_field(&doc, keys::TASK_ID);
    if let Some(primary) = task_id {
        if !related_tasks.is_empty() && !related_tasks.contains(&primary) {
            related_tasks.insert(0, primary);
        }
    }

    Ok(Resource {
        id,
        name: string_field(&doc, keys::NAME).unwrap_or_default(),
        description: string_field(&doc, keys::DESCRIPTION).unwrap_or_default(),
        resource_type: string_field(&doc, keys::RESOURCE_TYPE)
            .map(|raw| parse_resource_type(&raw))
            .unwrap_or_default(),
        category: string_field(&doc, keys::CATEGORY).unwrap_or_default(),
        tags: tags_field(&doc, keys::TAGS),
        brand_id: uuid_field(&doc, keys::BRAND_ID),
        brand_name: None,
        client_name: None,
        task_id,
        related_tasks,
        submitted_by: string_field(&doc, keys::SUBMITTED_BY),
        uploaded_at: timestamp_field(&doc, keys::UPLOADED_AT).unwrap_or(stored_at),
        status,
        review,
        url: string_field(&doc, keys::URL),
    })
}

pub fn normalize_brand(id: Uuid, data: &JsonValue) -> Result<BrandDisplay, RepositoryError> {
    let doc = as_document(id, data, "Brand")?;
    Ok(BrandDisplay {
        name: string_field(&doc, keys::NAME),
        client_name: string_field(&doc, keys::CLIENT_NAME),
    })
}

pub fn normalize_task(
    id: Uuid,
    data: &JsonValue,
    created_at: DateTime<Utc>,
) -> Result<Task, RepositoryError> {
    let doc = as_document(id, data, "Task")?;

    let due_date = timestamp_field(&doc, keys::DUE_DATE).unwrap_or_else(|| {
        tracing::warn!(task_id = %id, "Task has no due date, using creation time");
        created_at
    });

    Ok(Task {
        id,
        title: string_field(&doc, keys::TITLE).unwrap_or_default(),
        description: string_field(&doc, keys::DESCRIPTION).unwrap_or_default(),
        brand_id: uuid_field(&doc, keys::BRAND_ID),
        status: string_field(&doc, keys::STATUS)
            .and_then(|raw| parse_task_status(&raw))
            .unwrap_or_default(),
        priority: string_field(&doc, keys::PRIORITY)
            .and_then(|raw| parse_task_priority(&raw))
            .unwrap_or_default(),
        assignee: string_field(&doc, keys::ASSIGNEE),
        due_date,
        related_resource_id: uuid_field(&doc, keys::RELATED_RESOURCE),
        created_at,
    })
}

/// Canonical document for a new resource.
pub fn resource_document(draft: &ResourceDraft) -> JsonValue {
    json!({
        "name": draft.name,
        "description": draft.description,
        "resource_type": draft.resource_type.as_str(),
        "category": draft.category,
        "tags": draft.tags,
        "brand_id": draft.brand_id,
        "task_id": draft.task_id,
        "related_tasks": draft.related_tasks,
        "submitted_by": draft.submitted_by,
        "uploaded_at": draft.uploaded_at,
        "status": draft.status.as_str(),
        "reviewed_by": JsonValue::Null,
        "reviewed_at": JsonValue::Null,
        "review_notes": JsonValue::Null,
        "url": draft.url,
    })
}

/// JSON object holding only the fields an update changes, merged into the
/// stored document.
pub fn update_patch(update: &ResourceUpdate) -> JsonValue {
    let mut patch = Map::new();
    if let Some(status) = update.status {
        patch.insert("status".into(), json!(status.as_str()));
    }
    match &update.review {
        Some(Some(review)) => {
            patch.insert("reviewed_by".into(), json!(review.reviewed_by));
            patch.insert("reviewed_at".into(), json!(review.reviewed_at));
            patch.insert("review_notes".into(), json!(review.notes));
        }
        Some(None) => {
            patch.insert("reviewed_by".into(), JsonValue::Null);
            patch.insert("reviewed_at".into(), JsonValue::Null);
            patch.insert("review_notes".into(), JsonValue::Null);
        }
        None => {}
    }
    if let Some(task_id) = update.task_id {
        patch.insert("task_id".into(), json!(task_id));
    }
    if let Some(related) = &update.related_tasks {
        patch.insert("related_tasks".into(), json!(related));
    }
    JsonValue::Object(patch)
}

/// Canonical document for a new task.
pub fn task_document(draft: &TaskDraft) -> JsonValue {
    json!({
        "title": draft.title,
        "description": draft.description,
        "brand_id": draft.brand_id,
        "status": draft.status.to_string(),
        "priority": draft.priority.to_string(),
        "assignee": draft.assignee,
        "due_date": draft.due_date,
        "related_resource_id": draft.related_resource_id,
    })
}
