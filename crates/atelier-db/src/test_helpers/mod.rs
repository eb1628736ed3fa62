//! Test helpers for workflow tests
//!
//! In-memory repositories with call counters and failure injection, plus
//! fixtures. No database connection is needed.

pub mod fixtures;
pub mod mock_repositories;

pub use fixtures::*;
pub use mock_repositories::{CallCounts, MockResourceRepository, MockTaskRepository};
