// HTTP routes
pub mod admin;
pub mod export;
pub mod health;
pub mod notices;
pub mod projects;
pub mod rfis;
pub mod session;

pub use admin::*;
pub use export::*;
pub use health::*;
pub use notices::*;
pub use projects::*;
pub use rfis::*;
pub use session::*;
