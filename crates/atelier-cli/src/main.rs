//! review_desk: operate the resource review workflow from a terminal.
//!
//! Reads DATABASE_URL and the role allow-lists from the environment (or .env).

use anyhow::Context;
use atelier_cli::{due_in_days, error_report, init_tracing, resource_table};
use atelier_core::models::{
    PendingStep, ResourceType, ReviewStatus, TaskDraft, TaskPriority, TaskStatus,
    UploadDescriptor,
};
use atelier_core::{Actor, WorkflowConfig, WorkflowError};
use atelier_db::{connect, run_migrations, PgResourceRepository, PgTaskRepository};
use atelier_services::{
    FilterState, LinkTarget, OrchestratorSettings, RetryOutcome, UploadItemOutcome,
    WorkflowOrchestrator,
};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "review_desk", about = "Review and link creative resources")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List resources, optionally filtered
    List {
        /// Filter by review status: pending_review, approved, needs_review, rejected
        #[arg(long)]
        status: Option<ReviewStatus>,
        /// Filter by type: image, video, audio, document, archive, url, unknown
        #[arg(long)]
        r#type: Option<ResourceType>,
        /// Case-insensitive search over names, brand, client and people
        #[arg(long, short)]
        query: Option<String>,
        /// Output format; the other commands always print JSON
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Record a review decision
    Review {
        /// Resource UUID
        resource_id: Uuid,
        /// New status: approved, needs_review, rejected or pending_review
        status: ReviewStatus,
        /// Reviewer identity
        #[arg(long)]
        reviewer: String,
        /// Reviewer role, checked against REVIEWER_ROLES
        #[arg(long)]
        role: String,
        /// Observations; required for needs_review and rejected
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Link a resource to an existing task, or to a new one
    Link {
        /// Resource UUID
        resource_id: Uuid,
        /// Existing task UUID
        #[arg(long, conflicts_with = "new_title")]
        task: Option<Uuid>,
        /// Title of a task to create and link
        #[arg(long)]
        new_title: Option<String>,
        /// Assignee of the new task
        #[arg(long)]
        assignee: Option<String>,
        /// Days until the new task is due
        #[arg(long, default_value = "7")]
        due_days: i64,
        /// Acting user
        #[arg(long)]
        actor: String,
        /// Acting user's role, checked against ASSIGNER_ROLES
        #[arg(long)]
        role: String,
    },
    /// Record uploaded files listed in a JSON manifest (array of descriptors)
    Upload {
        /// Path to the manifest
        manifest: PathBuf,
        /// Uploader identity
        #[arg(long)]
        uploader: String,
    },
    /// Re-issue the pending step reported by a partial failure
    Retry {
        /// Path to a JSON file holding the `pending` object of the error report
        pending: PathBuf,
        /// Acting user
        #[arg(long)]
        actor: String,
        /// Acting user's role
        #[arg(long)]
        role: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

enum Rendered {
    Json(JsonValue),
    Text(String),
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = WorkflowConfig::from_env().context("Failed to load configuration")?;
    let pool = connect(&config).await?;
    run_migrations(&pool).await?;

    let orchestrator = WorkflowOrchestrator::new(
        Arc::new(PgResourceRepository::new(pool.clone())),
        Arc::new(PgTaskRepository::new(pool)),
        Arc::new(config.capabilities()),
        OrchestratorSettings::from(&config),
    );
    let loaded = orchestrator.refresh().await?;
    tracing::debug!(loaded, "Resource snapshot loaded");

    match run(&orchestrator, cli.command).await {
        Ok(Rendered::Json(value)) => print_json(&value),
        Ok(Rendered::Text(text)) => {
            print!("{}", text);
            Ok(())
        }
        Err(err) => {
            print_json(&error_report(&err))?;
            std::process::exit(1);
        }
    }
}

async fn run(
    orchestrator: &WorkflowOrchestrator,
    command: Commands,
) -> Result<Rendered, WorkflowError> {
    let rendered = match command {
        Commands::List {
            status,
            r#type,
            query,
            format,
        } => {
            let state = FilterState {
                search_term: query.unwrap_or_default(),
                status,
                resource_type: r#type,
            };
            let resources = orchestrator.get_filtered(&state).await;
            match format {
                OutputFormat::Json => Rendered::Json(json!(resources)),
                OutputFormat::Table => Rendered::Text(format!(
                    "{}\n{} resource(s)\n",
                    resource_table(&resources),
                    resources.len()
                )),
            }
        }
        Commands::Review {
            resource_id,
            status,
            reviewer,
            role,
            notes,
        } => {
            let outcome = orchestrator
                .submit_review(resource_id, status, &Actor::new(reviewer, role), &notes)
                .await?;
            Rendered::Json(json!({
                "resource": outcome.resource,
                "remedial_task": outcome.remedial_task,
            }))
        }
        Commands::Link {
            resource_id,
            task,
            new_title,
            assignee,
            due_days,
            actor,
            role,
        } => {
            let target = match (task, new_title) {
                (Some(task_id), _) => LinkTarget::Existing(task_id),
                (None, Some(title)) => LinkTarget::New(TaskDraft {
                    title,
                    description: String::new(),
                    brand_id: None,
                    status: TaskStatus::Pending,
                    priority: TaskPriority::Normal,
                    assignee,
                    due_date: due_in_days(Utc::now(), due_days)?,
                    related_resource_id: Some(resource_id),
                }),
                (None, None) => {
                    return Err(WorkflowError::Validation(
                        "Pass --task or --new-title".to_string(),
                    ))
                }
            };
            let outcome = orchestrator
                .link_resource(resource_id, target, &Actor::new(actor, role))
                .await?;
            Rendered::Json(json!({
                "resource": outcome.resource,
                "task_id": outcome.task_id,
                "created_task": outcome.created_task,
                "changed": outcome.changed,
            }))
        }
        Commands::Upload { manifest, uploader } => {
            let descriptors: Vec<UploadDescriptor> = read_json(&manifest)
                .map_err(|e| WorkflowError::Validation(format!("{:#}", e)))?;
            let report = orchestrator.record_upload(descriptors, &uploader).await?;
            let items: Vec<_> = report
                .items
                .iter()
                .map(|item| match item {
                    UploadItemOutcome::Created { index, resource } => {
                        json!({ "index": index, "created": resource })
                    }
                    UploadItemOutcome::Failed { index, name, error } => {
                        json!({ "index": index, "name": name, "failed": error_report(error) })
                    }
                })
                .collect();
            Rendered::Json(json!({
                "succeeded": report.succeeded(),
                "failed": report.failed(),
                "items": items,
            }))
        }
        Commands::Retry {
            pending,
            actor,
            role,
        } => {
            let step: PendingStep = read_json(&pending)
                .map_err(|e| WorkflowError::Validation(format!("{:#}", e)))?;
            match orchestrator.retry_pending(step, &Actor::new(actor, role)).await? {
                RetryOutcome::RemedialTaskCreated(task) => {
                    Rendered::Json(json!({ "remedial_task": task }))
                }
                RetryOutcome::Linked(resource) => Rendered::Json(json!({ "resource": resource })),
            }
        }
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_format_parses_as_value_enum() {
        let cli = Cli::try_parse_from(["review_desk", "list", "--format", "json"]).unwrap();
        match cli.command {
            Commands::List { format, .. } => assert_eq!(format, OutputFormat::Json),
            _ => panic!("expected list"),
        }
        let cli = Cli::try_parse_from(["review_desk", "list"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::List {
                format: OutputFormat::Table,
                ..
            }
        ));
        assert!(Cli::try_parse_from(["review_desk", "list", "--format", "yaml"]).is_err());
    }

    #[test]
    fn format_is_only_accepted_by_list() {
        let id = Uuid::new_v4().to_string();
        let args = [
            "review_desk", "review", &id, "approved", "--reviewer", "carla", "--role", "lead",
            "--format", "table",
        ];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
