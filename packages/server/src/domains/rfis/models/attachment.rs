use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{AttachmentId, ResponseId, RfiId, UserId};
use crate::kernel::{Gateway, GatewayError, RowQuery, Table};

/// Attachment model - row in the `attachments` table
///
/// Files live in the backend's storage; this row only references them.
/// `response_id` is set when the file came with a response rather than the
/// RFI itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub rfi_id: RfiId,
    #[serde(default)]
    pub response_id: Option<ResponseId>,
    pub file_name: String,
    pub file_url: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub uploaded_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Attachment {
    pub async fn find_by_rfi(rfi_id: RfiId, gateway: &Gateway) -> Result<Vec<Self>, GatewayError> {
        gateway
            .fetch_all(
                Table::Attachments,
                &RowQuery::all()
                    .eq("rfi_id", rfi_id)
                    .order_by("created_at", true),
            )
            .await
    }

    pub async fn insert(&self, gateway: &Gateway) -> Result<Self, GatewayError> {
        gateway.insert_row(Table::Attachments, self).await
    }

    pub async fn delete_for_response(
        response_id: ResponseId,
        gateway: &Gateway,
    ) -> Result<usize, GatewayError> {
        gateway
            .delete_rows(
                Table::Attachments,
                &RowQuery::all().eq("response_id", response_id),
            )
            .await
    }

    pub async fn delete_for_rfi(rfi_id: RfiId, gateway: &Gateway) -> Result<usize, GatewayError> {
        gateway
            .delete_rows(Table::Attachments, &RowQuery::all().eq("rfi_id", rfi_id))
            .await
    }
}
