use crate::common::{Capability, SessionContext};
use crate::domains::projects::models::Project;
use crate::kernel::{GatewayError, ServerDeps};

pub async fn list_projects(
    session: &SessionContext,
    deps: &ServerDeps,
) -> Result<Vec<Project>, GatewayError> {
    session.require(Capability::ViewProjects)?;
    Project::find_all(&deps.gateway).await
}
