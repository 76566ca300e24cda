//! Pure access decisions.
//!
//! `decide` is the single lookup every permission check goes through. It
//! never touches I/O, so the same role state and requirement always give the
//! same answer.

use serde::Serialize;

use super::{Capability, Role, RoleState};

/// What the caller wants to do, expressed either as a capability or as an
/// explicit list of roles that may proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Capability(Capability),
    /// A permission name as sent by a client. Unknown names are denied.
    Named(String),
    AnyRole(Vec<Role>),
}

impl Requirement {
    /// Build a requirement from an optional permission name and an optional
    /// allowed-role list. The name wins when both are given; neither gives a
    /// requirement nobody satisfies.
    pub fn from_parts(permission: Option<&str>, allowed_roles: Option<&[Role]>) -> Self {
        match (permission, allowed_roles) {
            (Some(name), _) => Requirement::Named(name.to_string()),
            (None, Some(roles)) => Requirement::AnyRole(roles.to_vec()),
            (None, None) => Requirement::AnyRole(Vec::new()),
        }
    }
}

impl From<Capability> for Requirement {
    fn from(capability: Capability) -> Self {
        Requirement::Capability(capability)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allowed,
    Denied,
    /// The role is not known yet. Treated as a denial by callers, but kept
    /// apart so a loading state is never shown as "you may not do this".
    Pending,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }
}

pub fn decide(role_state: &RoleState, requirement: &Requirement) -> Decision {
    let role = match role_state {
        RoleState::Pending => return Decision::Pending,
        RoleState::SignedOut => return Decision::Denied,
        RoleState::Resolved(role) => *role,
    };

    let allowed = match requirement {
        Requirement::Capability(capability) => role.has(*capability),
        Requirement::Named(name) => name
            .parse::<Capability>()
            .map(|capability| role.has(capability))
            .unwrap_or(false),
        Requirement::AnyRole(roles) => roles.contains(&role),
    };

    if allowed {
        Decision::Allowed
    } else {
        Decision::Denied
    }
}
