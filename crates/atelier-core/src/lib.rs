//! Atelier Core Library
//!
//! This crate provides the domain models, error types, configuration and
//! capability hooks shared by every Atelier component. It performs no I/O.

pub mod config;
pub mod error;
pub mod hooks;
pub mod models;

// Re-export commonly used types
pub use config::WorkflowConfig;
pub use error::{ErrorKind, ErrorMetadata, LogLevel, RepositoryError, WorkflowError};
pub use hooks::{Actor, ActorRole, AllowAll, CapabilityCheck, RoleCapabilities};
