use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{ResponseId, RfiId, UserId};
use crate::kernel::{Gateway, GatewayError, RowQuery, Table};

/// RfiResponse model - row in the `rfi_responses` table
///
/// Belongs to exactly one RFI and never outlives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfiResponse {
    pub id: ResponseId,
    pub rfi_id: RfiId,
    pub content: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl RfiResponse {
    /// Responses for an RFI in the order they were written.
    pub async fn find_by_rfi(rfi_id: RfiId, gateway: &Gateway) -> Result<Vec<Self>, GatewayError> {
        gateway
            .fetch_all(
                Table::RfiResponses,
                &RowQuery::all()
                    .eq("rfi_id", rfi_id)
                    .order_by("created_at", true),
            )
            .await
    }

    pub async fn insert(&self, gateway: &Gateway) -> Result<Self, GatewayError> {
        gateway.insert_row(Table::RfiResponses, self).await
    }

    pub async fn delete(id: ResponseId, gateway: &Gateway) -> Result<bool, GatewayError> {
        let removed = gateway
            .delete_rows(Table::RfiResponses, &RowQuery::all().eq("id", id))
            .await?;
        Ok(removed > 0)
    }

    pub async fn delete_for_rfi(rfi_id: RfiId, gateway: &Gateway) -> Result<usize, GatewayError> {
        gateway
            .delete_rows(Table::RfiResponses, &RowQuery::all().eq("rfi_id", rfi_id))
            .await
    }
}
