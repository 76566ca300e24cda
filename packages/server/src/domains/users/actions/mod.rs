//! User actions - invitations and session resolution

mod invite_user;
mod resolve_session;

pub use invite_user::invite_user;
pub use resolve_session::{resolve_role, resolve_session};
