//! RFIs domain - creation, status lifecycle, responses and attachments
//!
//! Status changes go through `lifecycle`; nothing else writes the status
//! column after creation.

pub mod actions;
pub mod data;
pub mod lifecycle;
pub mod models;

pub use data::{AddResponseInput, CreateRfiInput, RfiData, RfiResponseData, UpdateStatusInput};
pub use lifecycle::{apply_transition, plan_transition, StatusChange, TransitionError};
pub use models::{Attachment, Rfi, RfiResponse, RfiStatus, Urgency};
