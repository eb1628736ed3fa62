//! Atelier workflow services
//!
//! Pure review, remediation, linking and filtering rules, and the
//! `WorkflowOrchestrator` that sequences them with repository calls and keeps
//! the resource cache the filter reads from.

pub mod cache;
pub mod filter;
pub mod linker;
pub mod orchestrator;
pub mod remedial;
pub mod review;

pub use cache::ResourceCache;
pub use filter::{filter, FilterState};
pub use orchestrator::{
    BatchUploadReport, LinkOutcome, LinkTarget, OrchestratorSettings, RetryOutcome,
    ReviewOutcome, UploadItemOutcome, WorkflowOrchestrator,
};
pub use remedial::REMEDIAL_DUE_DAYS;
pub use review::{apply_transition, Transition};
