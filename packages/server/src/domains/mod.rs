// Business domains
pub mod export;
pub mod projects;
pub mod rfis;
pub mod users;
