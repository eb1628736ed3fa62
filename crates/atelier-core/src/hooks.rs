//! Capability hooks
//!
//! Authorization lives outside the review workflow. The workflow only asks
//! whether an actor's role may review or assign, through `CapabilityCheck`.
//! The host application supplies the implementation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Role name as issued by the host's authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorRole(String);

impl ActorRole {
    pub fn new(role: impl Into<String>) -> Self {
        Self(role.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The caller of an orchestrated operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub identity: String,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(identity: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            role: ActorRole::new(role),
        }
    }

    /// Identity with surrounding whitespace removed; `None` when blank.
    pub fn identity(&self) -> Option<&str> {
        Some(self.identity.trim()).filter(|s| !s.is_empty())
    }
}

/// Synchronous permission predicates supplied by the host.
pub trait CapabilityCheck: Send + Sync {
    /// May this role record review outcomes?
    fn can_review(&self, role: &ActorRole) -> bool;

    /// May this role link resources to tasks?
    fn can_assign(&self, role: &ActorRole) -> bool;
}

/// Grants every capability. For hosts that authorize upstream.
pub struct AllowAll;

impl CapabilityCheck for AllowAll {
    fn can_review(&self, _role: &ActorRole) -> bool {
        true
    }

    fn can_assign(&self, _role: &ActorRole) -> bool {
        true
    }
}

/// Role allow-lists, usually built from `WorkflowConfig`. Role names compare
/// case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct RoleCapabilities {
    reviewer_roles: HashSet<String>,
    assigner_roles: HashSet<String>,
}

impl RoleCapabilities {
    pub fn new<R, A>(reviewer_roles: R, assigner_roles: A) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            reviewer_roles: reviewer_roles
                .into_iter()
                .map(|r| Into::<String>::into(r).to_lowercase())
                .collect(),
            assigner_roles: assigner_roles
                .into_iter()
                .map(|r| Into::<String>::into(r).to_lowercase())
                .collect(),
        }
    }
}

impl CapabilityCheck for RoleCapabilities {
    fn can_review(&self, role: &ActorRole) -> bool {
        self.reviewer_roles.contains(&role.as_str().to_lowercase())
    }

    fn can_assign(&self, role: &ActorRole) -> bool {
        self.assigner_roles.contains(&role.as_str().to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_capabilities() {
        let caps = RoleCapabilities::new(["admin", "creative_lead"], ["admin", "account"]);
        assert!(caps.can_review(&ActorRole::new("creative_lead")));
        assert!(!caps.can_assign(&ActorRole::new("creative_lead")));
        assert!(caps.can_assign(&ActorRole::new("Account")));
        assert!(!caps.can_review(&ActorRole::new("designer")));
    }

    #[test]
    fn test_blank_identity_is_none() {
        assert_eq!(Actor::new("  ", "admin").identity(), None);
        assert_eq!(Actor::new(" lead ", "admin").identity(), Some("lead"));
    }
}
