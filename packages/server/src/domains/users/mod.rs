//! Users domain - invitations, role lookup and sessions

pub mod actions;
pub mod data;
pub mod models;

pub use data::{InviteUserInput, SessionData, UserData};
pub use models::{RoleDefinition, User, UserStatus};
