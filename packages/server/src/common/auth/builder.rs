use super::{decide, AuthError, Capability, Decision, RoleState};
use crate::common::UserId;

/// Entry point for authorization checks
///
/// Usage:
/// ```
/// use rfi_core::common::{Actor, Capability, Role, RoleState, UserId};
///
/// Actor::new(UserId::new(), RoleState::Resolved(Role::Contractor))
///     .can(Capability::CreateRfi)
///     .check()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    actor_id: UserId,
    role: RoleState,
}

impl Actor {
    pub fn new(actor_id: UserId, role: RoleState) -> Self {
        Self { actor_id, role }
    }

    pub fn id(&self) -> UserId {
        self.actor_id
    }

    pub fn role(&self) -> RoleState {
        self.role
    }

    /// Specify what capability the actor needs
    pub fn can(self, capability: Capability) -> CapabilityBuilder {
        CapabilityBuilder {
            actor: self,
            capability,
        }
    }
}

/// Builder after specifying capability
pub struct CapabilityBuilder {
    actor: Actor,
    capability: Capability,
}

impl CapabilityBuilder {
    pub fn check(self) -> Result<(), AuthError> {
        match decide(&self.actor.role, &self.capability.into()) {
            Decision::Allowed => Ok(()),
            Decision::Pending => Err(AuthError::RolePending),
            Decision::Denied => {
                tracing::debug!(
                    actor_id = %self.actor.actor_id,
                    capability = %self.capability,
                    "Capability denied"
                );
                Err(AuthError::denied(self.capability))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Role;

    #[test]
    fn test_allowed_capability_passes() {
        let result = Actor::new(UserId::new(), RoleState::Resolved(Role::Admin))
            .can(Capability::InviteUsers)
            .check();
        assert!(result.is_ok());
    }

    #[test]
    fn test_missing_capability_is_denied() {
        let result = Actor::new(UserId::new(), RoleState::Resolved(Role::Contractor))
            .can(Capability::UpdateRfiStatus)
            .check();
        assert_eq!(
            result,
            Err(AuthError::PermissionDenied("update_rfi_status".into()))
        );
    }

    #[test]
    fn test_pending_role_is_reported_separately() {
        let result = Actor::new(UserId::new(), RoleState::Pending)
            .can(Capability::ViewRfis)
            .check();
        assert_eq!(result, Err(AuthError::RolePending));
    }
}
