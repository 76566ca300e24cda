pub mod attachment;
pub mod response;
pub mod rfi;

pub use attachment::Attachment;
pub use response::RfiResponse;
pub use rfi::{Rfi, RfiStatus, Urgency};
