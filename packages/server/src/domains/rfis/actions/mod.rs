//! RFI actions - business logic functions
//!
//! Every action authorizes against the session first. Mutating actions also
//! post their outcome to the caller's notice board.

mod add_response;
mod create_rfi;
mod delete_rfi;
mod queries;
mod update_status;

pub use add_response::add_response;
pub use create_rfi::create_rfi;
pub use delete_rfi::delete_rfi;
pub use queries::{get_rfi, list_rfis, load_rfi_data};
pub use update_status::update_rfi_status;

use chrono::Utc;

use crate::common::{AttachmentId, ResponseId, RfiId, SessionContext, UserId};
use crate::domains::rfis::data::NewAttachment;
use crate::domains::rfis::models::Attachment;
use crate::kernel::{GatewayError, NoticeLevel, ServerDeps};

/// Post a success or error notice for the signed-in user.
async fn post_outcome<T>(
    deps: &ServerDeps,
    session: &SessionContext,
    result: &Result<T, GatewayError>,
    success: impl FnOnce(&T) -> String,
) {
    let Some(user) = session.user() else {
        return;
    };
    let (level, message) = match result {
        Ok(value) => (NoticeLevel::Success, success(value)),
        Err(err) => (NoticeLevel::Error, err.user_message()),
    };
    deps.notices.post(user.id, level, message).await;
}

/// Store the attachments that came with an RFI or response.
async fn store_attachments(
    deps: &ServerDeps,
    rfi_id: RfiId,
    response_id: Option<ResponseId>,
    uploaded_by: UserId,
    attachments: Vec<NewAttachment>,
) -> Result<Vec<Attachment>, GatewayError> {
    let mut stored = Vec::with_capacity(attachments.len());
    for attachment in attachments {
        let row = Attachment {
            id: AttachmentId::new(),
            rfi_id,
            response_id,
            file_name: attachment.file_name.trim().to_string(),
            file_url: attachment.file_url.trim().to_string(),
            content_type: attachment.content_type,
            size_bytes: attachment.size_bytes,
            uploaded_by,
            created_at: Utc::now(),
        };
        stored.push(row.insert(&deps.gateway).await?);
    }
    Ok(stored)
}
