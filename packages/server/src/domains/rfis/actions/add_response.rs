//! Add response action

use chrono::Utc;
use tracing::{info, warn};

use super::{post_outcome, store_attachments};
use crate::common::{Capability, ResponseId, RfiId, SessionContext};
use crate::domains::rfis::data::{AddResponseInput, RfiResponseData};
use crate::domains::rfis::models::{Attachment, Rfi, RfiResponse};
use crate::kernel::{GatewayError, ServerDeps};

pub async fn add_response(
    rfi_id: RfiId,
    input: AddResponseInput,
    session: &SessionContext,
    deps: &ServerDeps,
) -> Result<RfiResponseData, GatewayError> {
    let result = respond(rfi_id, input, session, deps).await;
    post_outcome(deps, session, &result, |_| "Response added".to_string()).await;
    result
}

async fn respond(
    rfi_id: RfiId,
    input: AddResponseInput,
    session: &SessionContext,
    deps: &ServerDeps,
) -> Result<RfiResponseData, GatewayError> {
    let user = session.require(Capability::RespondToRfi)?.clone();
    input.validate()?;

    // Responses never outlive their RFI, so the parent must exist.
    let rfi = Rfi::find_by_id(rfi_id, &deps.gateway).await?;

    let response = RfiResponse {
        id: ResponseId::new(),
        rfi_id: rfi.id,
        content: input.content,
        created_by: user.id,
        created_at: Utc::now(),
    }
    .insert(&deps.gateway)
    .await?;

    let attachments =
        match store_attachments(deps, rfi.id, Some(response.id), user.id, input.attachments).await
        {
            Ok(attachments) => attachments,
            Err(e) => {
                discard(&response, deps).await;
                return Err(e);
            }
        };

    info!(rfi_id = %rfi.id, response_id = %response.id, "Response added");

    let mut data = RfiResponseData::from(response);
    data.attachments = attachments.into_iter().map(Into::into).collect();
    Ok(data)
}

async fn discard(response: &RfiResponse, deps: &ServerDeps) {
    if let Err(e) = Attachment::delete_for_response(response.id, &deps.gateway).await {
        warn!(response_id = %response.id, error = %e, "Failed to remove attachments of discarded response");
    }
    if let Err(e) = RfiResponse::delete(response.id, &deps.gateway).await {
        warn!(response_id = %response.id, error = %e, "Failed to discard partially created response");
    }
}
