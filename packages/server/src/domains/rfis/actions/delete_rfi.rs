//! Delete RFI action

use tracing::{info, warn};

use super::post_outcome;
use crate::common::{Capability, RfiId, SessionContext};
use crate::domains::rfis::models::{Attachment, Rfi, RfiResponse};
use crate::kernel::{GatewayError, ServerDeps};

/// Delete an RFI together with its responses and attachment rows.
pub async fn delete_rfi(
    id: RfiId,
    session: &SessionContext,
    deps: &ServerDeps,
) -> Result<RfiId, GatewayError> {
    let result = delete(id, session, deps).await;
    post_outcome(deps, session, &result, |_| "RFI deleted".to_string()).await;
    result
}

async fn delete(
    id: RfiId,
    session: &SessionContext,
    deps: &ServerDeps,
) -> Result<RfiId, GatewayError> {
    session.require(Capability::DeleteRfi)?;
    let rfi = Rfi::find_by_id(id, &deps.gateway).await?;

    // Snapshot the children so a failed delete can put them back.
    let responses = RfiResponse::find_by_rfi(rfi.id, &deps.gateway).await?;
    let attachments = Attachment::find_by_rfi(rfi.id, &deps.gateway).await?;

    // Children first so nothing is left pointing at a missing RFI.
    Attachment::delete_for_rfi(rfi.id, &deps.gateway).await?;
    if let Err(e) = RfiResponse::delete_for_rfi(rfi.id, &deps.gateway).await {
        restore(&[], &attachments, deps).await;
        return Err(e);
    }
    match Rfi::delete(rfi.id, &deps.gateway).await {
        Ok(true) => {}
        Ok(false) => return Err(GatewayError::NotFound("RFI".to_string())),
        Err(e) => {
            restore(&responses, &attachments, deps).await;
            return Err(e);
        }
    }

    info!(
        rfi_id = %rfi.id,
        responses = responses.len(),
        attachments = attachments.len(),
        "RFI deleted"
    );
    Ok(rfi.id)
}

/// Put back children removed by a delete that did not finish.
async fn restore(responses: &[RfiResponse], attachments: &[Attachment], deps: &ServerDeps) {
    // Responses before attachments, which may point at them.
    for response in responses {
        if let Err(e) = response.insert(&deps.gateway).await {
            warn!(response_id = %response.id, error = %e, "Failed to restore response");
        }
    }
    for attachment in attachments {
        if let Err(e) = attachment.insert(&deps.gateway).await {
            warn!(attachment_id = %attachment.id, error = %e, "Failed to restore attachment");
        }
    }
}
