//! Create project action

use chrono::Utc;
use tracing::info;

use crate::common::{Capability, ProjectId, SessionContext};
use crate::domains::projects::data::CreateProjectInput;
use crate::domains::projects::models::Project;
use crate::kernel::{GatewayError, ServerDeps};

/// Validate and persist a new project.
///
/// Field errors are reported together; nothing reaches the backend unless
/// the whole input is valid.
pub async fn create_project(
    input: CreateProjectInput,
    session: &SessionContext,
    deps: &ServerDeps,
) -> Result<Project, GatewayError> {
    let user = session.require(Capability::CreateProject)?;
    input.validate()?;

    let now = Utc::now();
    let project = Project {
        id: ProjectId::new(),
        name: input.name.trim().to_string(),
        contract_number: input.contract_number.trim().to_string(),
        client_company: input.client_company.trim().to_string(),
        project_manager_email: input.pm_email.trim().to_string(),
        standard_recipients: input.recipient_set(),
        disciplines: input.discipline_set(),
        default_urgent: input.default_urgent,
        created_at: now,
        updated_at: now,
    };

    let created = project.insert(&deps.gateway).await?;
    info!(project_id = %created.id, created_by = %user.id, "Project created");
    Ok(created)
}
