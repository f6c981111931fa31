//! Access control entities

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Sensitivity tag for tools, parameters and memory entries.
///
/// Ordered from least to most sensitive so policies can express ceilings
/// (`sensitivity <= Internal`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    #[default]
    Public,
    Internal,
    Confidential,
    Secret,
}

impl Sensitivity {
    pub fn as_str(&self) -> &str {
        match self {
            Sensitivity::Public => "public",
            Sensitivity::Internal => "internal",
            Sensitivity::Confidential => "confidential",
            Sensitivity::Secret => "secret",
        }
    }

    /// Reads at this level go through the access gate.
    pub fn requires_read_check(&self) -> bool {
        *self >= Sensitivity::Confidential
    }
}

impl std::fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Sensitivity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(Sensitivity::Public),
            "internal" => Ok(Sensitivity::Internal),
            "confidential" => Ok(Sensitivity::Confidential),
            "secret" => Ok(Sensitivity::Secret),
            other => Err(format!("unknown sensitivity: {}", other)),
        }
    }
}

/// The identity on whose behalf a request is made.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            roles: BTreeSet::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Kind of resource an access request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Tool,
    Memory,
}

impl ResourceKind {
    pub fn as_str(&self) -> &str {
        match self {
            ResourceKind::Tool => "tool",
            ResourceKind::Memory => "memory",
        }
    }
}

/// Operation an access request wants to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Invoke,
    Read,
    Create,
    Update,
    Delete,
    List,
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::Invoke => "invoke",
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::List => "list",
        }
    }
}

/// Input to the access gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequest<'a> {
    pub identity: &'a Identity,
    pub resource_kind: ResourceKind,
    pub resource_id: &'a str,
    pub action: Action,
    pub sensitivity: Sensitivity,
    /// Owner of the resource, when the resource has one (memory entries).
    pub owner: Option<&'a str>,
}

impl<'a> AccessRequest<'a> {
    pub fn new(
        identity: &'a Identity,
        resource_kind: ResourceKind,
        resource_id: &'a str,
        action: Action,
        sensitivity: Sensitivity,
    ) -> Self {
        Self {
            identity,
            resource_kind,
            resource_id,
            action,
            sensitivity,
            owner: None,
        }
    }

    pub fn with_owner(mut self, owner: &'a str) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn is_owner(&self) -> bool {
        self.owner == Some(self.identity.id.as_str())
    }
}

/// Outcome of an access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny { reason: String },
}

impl AccessDecision {
    pub fn deny(reason: impl Into<String>) -> Self {
        AccessDecision::Deny {
            reason: reason.into(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitivity_ordering() {
        assert!(Sensitivity::Public < Sensitivity::Internal);
        assert!(Sensitivity::Confidential < Sensitivity::Secret);
        assert!(!Sensitivity::Internal.requires_read_check());
        assert!(Sensitivity::Confidential.requires_read_check());
        assert_eq!("SECRET".parse::<Sensitivity>().unwrap(), Sensitivity::Secret);
        assert!("top".parse::<Sensitivity>().is_err());
    }

    #[test]
    fn test_owner_check() {
        let alice = Identity::new("alice").with_role("agent");
        let req = AccessRequest::new(
            &alice,
            ResourceKind::Memory,
            "notes/today",
            Action::Update,
            Sensitivity::Internal,
        );
        assert!(!req.is_owner());
        assert!(req.clone().with_owner("alice").is_owner());
        assert!(!req.with_owner("bob").is_owner());
        assert!(alice.has_role("agent"));
    }
}
