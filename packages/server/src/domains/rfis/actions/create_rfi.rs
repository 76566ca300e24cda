//! Create RFI action
//!
//! The only creation path: HTTP handler → this action → gateway → backend.

use chrono::Utc;
use tracing::{info, warn};

use super::{post_outcome, store_attachments};
use crate::common::{Capability, FieldError, ProjectId, RfiId, SessionContext, UserId};
use crate::domains::projects::Project;
use crate::domains::rfis::data::{CreateRfiInput, RfiData};
use crate::domains::rfis::models::{Attachment, Rfi, RfiStatus, Urgency};
use crate::kernel::{GatewayError, ServerDeps};

/// Create an RFI in `open` status and number it within its project.
pub async fn create_rfi(
    input: CreateRfiInput,
    session: &SessionContext,
    deps: &ServerDeps,
) -> Result<RfiData, GatewayError> {
    let result = create(input, session, deps).await;
    post_outcome(deps, session, &result, |rfi| format!("{} created", rfi.rfi_number)).await;
    result
}

async fn create(
    input: CreateRfiInput,
    session: &SessionContext,
    deps: &ServerDeps,
) -> Result<RfiData, GatewayError> {
    let user = session.require(Capability::CreateRfi)?.clone();
    input.validate()?;

    let project_id = ProjectId::parse(input.project_id.trim())
        .map_err(|_| field_error("projectId", "Invalid project id"))?;
    let assigned_to = input
        .assigned_to
        .as_deref()
        .map(|id| UserId::parse(id.trim()))
        .transpose()
        .map_err(|_| field_error("assignedTo", "Invalid user id"))?;

    let project = Project::find_by_id(project_id, &deps.gateway).await?;

    let discipline = input
        .discipline
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    if let Some(discipline) = &discipline {
        if !project.disciplines.is_empty() && !project.disciplines.contains(discipline) {
            return Err(field_error(
                "discipline",
                "Discipline is not part of this project",
            ));
        }
    }

    let rfi_number = Rfi::next_number(project.id, &deps.gateway).await?;
    let now = Utc::now();
    let rfi = Rfi {
        id: RfiId::new(),
        project_id: project.id,
        rfi_number,
        title: input.title.trim().to_string(),
        description: input.description,
        status: RfiStatus::Open,
        urgency: input
            .urgency
            .unwrap_or_else(|| Urgency::from_flag(project.default_urgent)),
        discipline,
        due_date: input.due_date,
        created_by: user.id,
        assigned_to,
        created_at: now,
        updated_at: now,
    };

    let created = rfi.insert(&deps.gateway).await?;
    let attachments =
        match store_attachments(deps, created.id, None, user.id, input.attachments).await {
            Ok(attachments) => attachments,
            Err(e) => {
                discard(&created, deps).await;
                return Err(e);
            }
        };

    info!(
        rfi_id = %created.id,
        rfi_number = %created.rfi_number,
        project_id = %created.project_id,
        created_by = %user.id,
        "RFI created"
    );
    Ok(RfiData::from(created).with_children(Vec::new(), attachments))
}

/// Remove a half-created RFI so a retry does not leave a duplicate behind.
async fn discard(rfi: &Rfi, deps: &ServerDeps) {
    if let Err(e) = Attachment::delete_for_rfi(rfi.id, &deps.gateway).await {
        warn!(rfi_id = %rfi.id, error = %e, "Failed to remove attachments of discarded RFI");
    }
    match Rfi::delete(rfi.id, &deps.gateway).await {
        Ok(_) => info!(rfi_id = %rfi.id, rfi_number = %rfi.rfi_number, "Discarded partially created RFI"),
        Err(e) => warn!(rfi_id = %rfi.id, error = %e, "Failed to discard partially created RFI"),
    }
}

fn field_error(field: &str, message: &str) -> GatewayError {
    GatewayError::Validation(vec![FieldError {
        field: field.to_string(),
        message: message.to_string(),
    }])
}
