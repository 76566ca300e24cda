//! RFI status lifecycle.
//!
//! `plan_transition` is pure: it decides whether a status change may happen
//! and what it would write. `apply_transition` plans first and only then
//! issues one conditional backend update, so a rejected change never
//! reaches the backend.
//!
//! Checks run in a fixed order: terminal state, permission, no-op, table.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::common::{decide, AuthError, Capability, Decision, RoleState, SessionContext};
use crate::domains::rfis::models::{Rfi, RfiStatus};
use crate::kernel::{Gateway, GatewayError};

/// What a valid transition writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub from: RfiStatus,
    pub to: RfiStatus,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransitionError {
    #[error("This RFI is closed and its status can no longer change")]
    Terminal,

    #[error(transparent)]
    Permission(#[from] AuthError),

    #[error("This RFI is already {0}")]
    NoOp(RfiStatus),

    #[error("An RFI cannot move from {from} to {to}")]
    NotAllowed { from: RfiStatus, to: RfiStatus },
}

impl From<TransitionError> for GatewayError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::Permission(auth) => GatewayError::Permission(auth),
            TransitionError::NoOp(_) => GatewayError::NoOp(err.to_string()),
            TransitionError::Terminal | TransitionError::NotAllowed { .. } => {
                GatewayError::Transition(err.to_string())
            }
        }
    }
}

pub fn plan_transition(
    rfi: &Rfi,
    target: RfiStatus,
    role: RoleState,
    now: DateTime<Utc>,
) -> Result<StatusChange, TransitionError> {
    let from = rfi.status;
    if from.is_terminal() {
        return Err(TransitionError::Terminal);
    }

    match decide(&role, &Capability::UpdateRfiStatus.into()) {
        Decision::Allowed => {}
        Decision::Pending => return Err(AuthError::RolePending.into()),
        Decision::Denied if role == RoleState::SignedOut => {
            return Err(AuthError::AuthenticationRequired.into())
        }
        Decision::Denied => return Err(AuthError::denied(Capability::UpdateRfiStatus).into()),
    }

    if target == from {
        return Err(TransitionError::NoOp(from));
    }
    if !from.can_transition_to(target) {
        return Err(TransitionError::NotAllowed { from, to: target });
    }

    Ok(StatusChange {
        from,
        to: target,
        updated_at: now.max(rfi.updated_at),
    })
}

/// Plan and persist a status change. Returns the RFI as stored afterwards;
/// `rfi` itself is never modified, so on any error the caller still holds
/// the last known state.
pub async fn apply_transition(
    gateway: &Gateway,
    rfi: &Rfi,
    target: RfiStatus,
    session: &SessionContext,
) -> Result<Rfi, GatewayError> {
    let change = plan_transition(rfi, target, session.role_state(), Utc::now())?;

    let updated =
        Rfi::update_status_if(rfi.id, change.from, change.to, change.updated_at, gateway).await?;

    info!(
        rfi_id = %rfi.id,
        from = %change.from,
        to = %change.to,
        "RFI status changed"
    );
    Ok(updated)
}
