//! Per-request session context.
//!
//! Populated by the session middleware at request start, passed explicitly
//! to actions, and cleared on sign-out. Nothing reads the current user or role
//! from ambient state.

use serde::Serialize;

use super::{Actor, AuthError, Capability, Role};
use crate::common::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "role", rename_all = "snake_case")]
pub enum RoleState {
    /// Session started, role lookup not finished.
    Pending,
    Resolved(Role),
    SignedOut,
}

impl RoleState {
    pub fn role(&self) -> Option<Role> {
        match self {
            RoleState::Resolved(role) => Some(*role),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SessionContext {
    user: Option<SessionUser>,
    role: RoleState,
}

impl SessionContext {
    /// No authenticated user.
    pub fn anonymous() -> Self {
        Self {
            user: None,
            role: RoleState::SignedOut,
        }
    }

    /// A token was presented but could not be checked. Callers are told to
    /// retry rather than to sign in.
    pub fn unverified() -> Self {
        Self {
            user: None,
            role: RoleState::Pending,
        }
    }

    /// An authenticated user whose role is still being looked up.
    pub fn started(user: SessionUser) -> Self {
        Self {
            user: Some(user),
            role: RoleState::Pending,
        }
    }

    pub fn resolve(&mut self, role: Role) {
        if self.user.is_some() {
            self.role = RoleState::Resolved(role);
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.resolve(role);
        self
    }

    /// Sign-out: forget the user and the role.
    pub fn clear(&mut self) {
        self.user = None;
        self.role = RoleState::SignedOut;
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn role_state(&self) -> RoleState {
        self.role
    }

    pub fn require_user(&self) -> Result<&SessionUser, AuthError> {
        match (&self.user, self.role) {
            (Some(user), _) => Ok(user),
            (None, RoleState::Pending) => Err(AuthError::RolePending),
            (None, _) => Err(AuthError::AuthenticationRequired),
        }
    }

    pub fn actor(&self) -> Result<Actor, AuthError> {
        let user = self.require_user()?;
        Ok(Actor::new(user.id, self.role))
    }

    /// Authenticate and check one capability in a single call.
    pub fn require(&self, capability: Capability) -> Result<&SessionUser, AuthError> {
        self.actor()?.can(capability).check()?;
        self.require_user()
    }
}
