// Common types and utilities shared across the application

pub mod auth;
pub mod entity_ids;
pub mod id;
pub mod validation;

pub use auth::{
    decide, Actor, AuthError, Capability, Decision, Requirement, Role, RoleState,
    SessionContext, SessionUser,
};
pub use entity_ids::*;
pub use id::Id;
pub use validation::{FieldError, ValidationErrors, Validator};
