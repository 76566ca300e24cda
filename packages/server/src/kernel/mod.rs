//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod gateway;
pub mod notices;
pub mod pdf;
pub mod test_dependencies;
pub mod traits;

pub use deps::{ServerDeps, SupabaseAdapter};
pub use gateway::{Gateway, GatewayError, GatewayResult, GENERIC_FAILURE, NETWORK_FAILURE};
pub use notices::{Notice, NoticeBoard, NoticeLevel};
pub use pdf::{HtmlPreviewRenderer, RemotePdfRenderer};
pub use traits::*;
