pub mod role;
pub mod user;

pub use role::RoleDefinition;
pub use user::{User, UserStatus};
