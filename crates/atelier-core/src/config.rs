//! Configuration module
//!
//! Settings for the review workflow and its PostgreSQL adapters, read from the
//! environment (and a `.env` file when present).

use std::env;

use crate::hooks::RoleCapabilities;

const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
/// Default for `MAX_UPLOAD_BATCH` and `OrchestratorSettings::default()`.
pub const MAX_UPLOAD_BATCH: usize = 50;
const DEFAULT_REVIEWER_ROLES: &str = "admin,creative_director,creative_lead";
const DEFAULT_ASSIGNER_ROLES: &str = "admin,account_manager,creative_director";

#[derive(Clone, Debug)]
pub struct WorkflowConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
    /// Largest number of descriptors accepted by one `record_upload` call.
    pub max_upload_batch: usize,
    pub reviewer_roles: Vec<String>,
    pub assigner_roles: Vec<String>,
}

impl WorkflowConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let config = WorkflowConfig {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
            max_upload_batch: env::var("MAX_UPLOAD_BATCH")
                .unwrap_or_else(|_| MAX_UPLOAD_BATCH.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("MAX_UPLOAD_BATCH must be a valid number"))?,
            reviewer_roles: parse_list(
                &env::var("REVIEWER_ROLES").unwrap_or_else(|_| DEFAULT_REVIEWER_ROLES.to_string()),
            ),
            assigner_roles: parse_list(
                &env::var("ASSIGNER_ROLES").unwrap_or_else(|_| DEFAULT_ASSIGNER_ROLES.to_string()),
            ),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.database_url.trim().is_empty() {
            anyhow::bail!("DATABASE_URL cannot be empty");
        }
        if self.max_upload_batch == 0 {
            anyhow::bail!("MAX_UPLOAD_BATCH must be at least 1");
        }
        if self.reviewer_roles.is_empty() {
            anyhow::bail!("REVIEWER_ROLES must name at least one role");
        }
        Ok(())
    }

    pub fn capabilities(&self) -> RoleCapabilities {
        RoleCapabilities::new(self.reviewer_roles.clone(), self.assigner_roles.clone())
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{ActorRole, CapabilityCheck};

    fn config() -> WorkflowConfig {
        WorkflowConfig {
            database_url: "postgres://localhost/atelier".to_string(),
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            environment: "Production".to_string(),
            max_upload_batch: MAX_UPLOAD_BATCH,
            reviewer_roles: parse_list(DEFAULT_REVIEWER_ROLES),
            assigner_roles: parse_list(DEFAULT_ASSIGNER_ROLES),
        }
    }

    #[test]
    fn test_parse_list_trims_and_skips_blanks() {
        assert_eq!(parse_list(" Admin, ,lead ,"), vec!["admin", "lead"]);
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_validate() {
        assert!(config().validate().is_ok());

        let mut c = config();
        c.max_upload_batch = 0;
        assert!(c.validate().is_err());

        let mut c = config();
        c.reviewer_roles.clear();
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_capabilities_from_config() {
        let caps = config().capabilities();
        assert!(caps.can_review(&ActorRole::new("creative_lead")));
        assert!(caps.can_assign(&ActorRole::new("account_manager")));
        assert!(!caps.can_assign(&ActorRole::new("creative_lead")));
    }
}
