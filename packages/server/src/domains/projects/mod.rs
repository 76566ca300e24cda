//! Projects domain - project setup and listing
//!
//! A project is created once and referenced by many RFIs. RFIs hold the
//! owning project id; projects never list their RFIs.

pub mod actions;
pub mod data;
pub mod models;

pub use data::{CreateProjectInput, ProjectData};
pub use models::Project;
