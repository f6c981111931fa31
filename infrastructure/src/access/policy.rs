//! Rule-based access control.
//!
//! [`PolicyAccessControl`] evaluates an ordered list of [`AccessRule`]s.
//! Evaluation order:
//!
//! 1. The owner of a memory entry may always act on it
//! 2. The first rule that matches the request decides
//! 3. Otherwise the request is allowed only if its sensitivity is at or
//!    below the default ceiling
//!
//! Rules are plain data so they can be loaded from the `[access]` section
//! of the config file:
//!
//! ```toml
//! [access]
//! default_ceiling = "internal"
//!
//! [[access.rules]]
//! role = "admin"
//! effect = "allow"
//!
//! [[access.rules]]
//! resource = "tool"
//! id_prefix = "shell."
//! effect = "deny"
//! ```

use runtime_application::ports::access_control::AccessControlPort;
use runtime_domain::access::{
    AccessDecision, AccessRequest, Action, ResourceKind, Sensitivity,
};
use serde::{Deserialize, Serialize};

/// What a matching rule decides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleEffect {
    #[default]
    Allow,
    Deny,
}

/// One access rule. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessRule {
    /// Role the caller must hold
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Resource kind the rule covers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceKind>,
    /// Prefix the resource id must start with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_prefix: Option<String>,
    /// Actions the rule covers; empty means all
    pub actions: Vec<Action>,
    pub effect: RuleEffect,
    /// The rule only applies up to this sensitivity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_sensitivity: Option<Sensitivity>,
}

impl AccessRule {
    pub fn allow() -> Self {
        Self::default()
    }

    pub fn deny() -> Self {
        Self {
            effect: RuleEffect::Deny,
            ..Self::default()
        }
    }

    pub fn for_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn on(mut self, resource: ResourceKind) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = Some(prefix.into());
        self
    }

    pub fn with_actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions = actions.into_iter().collect();
        self
    }

    pub fn up_to(mut self, sensitivity: Sensitivity) -> Self {
        self.max_sensitivity = Some(sensitivity);
        self
    }

    pub fn matches(&self, request: &AccessRequest<'_>) -> bool {
        if let Some(role) = &self.role
            && !request.identity.has_role(role)
        {
            return false;
        }
        if let Some(resource) = self.resource
            && resource != request.resource_kind
        {
            return false;
        }
        if let Some(prefix) = &self.id_prefix
            && !request.resource_id.starts_with(prefix.as_str())
        {
            return false;
        }
        if !self.actions.is_empty() && !self.actions.contains(&request.action) {
            return false;
        }
        if let Some(ceiling) = self.max_sensitivity
            && request.sensitivity > ceiling
        {
            return false;
        }
        true
    }
}

/// [`AccessControlPort`] adapter driven by ordered rules.
#[derive(Debug, Clone)]
pub struct PolicyAccessControl {
    rules: Vec<AccessRule>,
    default_ceiling: Sensitivity,
}

impl Default for PolicyAccessControl {
    fn default() -> Self {
        Self::new(Sensitivity::Internal)
    }
}

impl PolicyAccessControl {
    pub fn new(default_ceiling: Sensitivity) -> Self {
        Self {
            rules: Vec::new(),
            default_ceiling,
        }
    }

    pub fn with_rule(mut self, rule: AccessRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_rules(mut self, rules: impl IntoIterator<Item = AccessRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }

    pub fn default_ceiling(&self) -> Sensitivity {
        self.default_ceiling
    }
}

impl AccessControlPort for PolicyAccessControl {
    fn authorize(&self, request: &AccessRequest<'_>) -> AccessDecision {
        if request.resource_kind == ResourceKind::Memory && request.is_owner() {
            return AccessDecision::Allow;
        }

        if let Some((index, rule)) = self
            .rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.matches(request))
        {
            tracing::trace!(
                rule = index,
                caller = %request.identity.id,
                resource = request.resource_id,
                "Access rule matched"
            );
            return match rule.effect {
                RuleEffect::Allow => AccessDecision::Allow,
                RuleEffect::Deny => AccessDecision::deny(format!(
                    "rule {} denies {} on {} '{}'",
                    index,
                    request.action.as_str(),
                    request.resource_kind.as_str(),
                    request.resource_id
                )),
            };
        }

        if request.sensitivity <= self.default_ceiling {
            AccessDecision::Allow
        } else {
            AccessDecision::deny(format!(
                "{} on {} {} '{}' requires an explicit rule",
                request.action.as_str(),
                request.sensitivity,
                request.resource_kind.as_str(),
                request.resource_id
            ))
        }
    }
}
