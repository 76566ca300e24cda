// RFI Tracker - API Core
//
// This crate provides the backend API for tracking Requests for Information
// between contractors and clients on construction projects. Persistence and
// authentication live in a hosted backend reached through `kernel` traits;
// the lifecycle and access rules live in `domains` and `common::auth`.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
