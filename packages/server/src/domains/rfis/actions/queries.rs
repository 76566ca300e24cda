use crate::common::{Capability, ProjectId, RfiId, SessionContext};
use crate::domains::rfis::data::RfiData;
use crate::domains::rfis::models::{Attachment, Rfi, RfiResponse};
use crate::kernel::{GatewayError, ServerDeps};

/// One RFI with its responses and attachments.
pub async fn get_rfi(
    id: RfiId,
    session: &SessionContext,
    deps: &ServerDeps,
) -> Result<RfiData, GatewayError> {
    session.require(Capability::ViewRfis)?;
    let rfi = Rfi::find_by_id(id, &deps.gateway).await?;
    load_rfi_data(rfi, deps).await
}

/// RFIs newest first, without their children.
pub async fn list_rfis(
    project_id: Option<ProjectId>,
    session: &SessionContext,
    deps: &ServerDeps,
) -> Result<Vec<RfiData>, GatewayError> {
    session.require(Capability::ViewRfis)?;
    let rfis = Rfi::find_all(project_id, &deps.gateway).await?;
    Ok(rfis.into_iter().map(RfiData::from).collect())
}

pub async fn load_rfi_data(rfi: Rfi, deps: &ServerDeps) -> Result<RfiData, GatewayError> {
    let responses = RfiResponse::find_by_rfi(rfi.id, &deps.gateway).await?;
    let attachments = Attachment::find_by_rfi(rfi.id, &deps.gateway).await?;
    Ok(RfiData::from(rfi).with_children(responses, attachments))
}
