use thiserror::Error;

use super::Capability;

/// Authorization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authentication required")]
    AuthenticationRequired,

    /// The session exists but its role has not been resolved yet.
    #[error("Permissions are still loading")]
    RolePending,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

impl AuthError {
    pub fn denied(capability: Capability) -> Self {
        AuthError::PermissionDenied(capability.to_string())
    }
}
