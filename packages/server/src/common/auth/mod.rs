/// Authorization module
///
/// Provides a fluent API for authorization checks in actions:
///
/// ```rust,ignore
/// session
///     .actor()?
///     .can(Capability::UpdateRfiStatus)
///     .check()?;
/// ```
///
/// Role semantics live in one table (`Role::capabilities`) and every check
/// goes through `decide`.

mod builder;
mod capability;
mod errors;
mod policy;
mod session;

pub use builder::{Actor, CapabilityBuilder};
pub use capability::{Capability, Role};
pub use errors::AuthError;
pub use policy::{decide, Decision, Requirement};
pub use session::{RoleState, SessionContext, SessionUser};
