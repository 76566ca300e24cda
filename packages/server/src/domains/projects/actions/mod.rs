//! Project actions - business logic functions
//!
//! Actions take the explicit session context and the server dependencies,
//! authorize first, and return typed results the HTTP layer folds into
//! `GatewayResult`.

mod create_project;
mod queries;

pub use create_project::create_project;
pub use queries::list_projects;
