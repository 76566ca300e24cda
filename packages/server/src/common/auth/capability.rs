use serde::{Deserialize, Serialize};

/// Named actions a role may or may not perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewProjects,
    CreateProject,
    ViewRfis,
    CreateRfi,
    UpdateRfiStatus,
    RespondToRfi,
    DeleteRfi,
    ExportRfis,
    InviteUsers,
}

impl Capability {
    pub const ALL: [Capability; 9] = [
        Capability::ViewProjects,
        Capability::CreateProject,
        Capability::ViewRfis,
        Capability::CreateRfi,
        Capability::UpdateRfiStatus,
        Capability::RespondToRfi,
        Capability::DeleteRfi,
        Capability::ExportRfis,
        Capability::InviteUsers,
    ];

    /// Whether exercising this capability changes stored data.
    pub fn is_mutating(&self) -> bool {
        !matches!(
            self,
            Capability::ViewProjects | Capability::ViewRfis | Capability::ExportRfis
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ViewProjects => "view_projects",
            Capability::CreateProject => "create_project",
            Capability::ViewRfis => "view_rfis",
            Capability::CreateRfi => "create_rfi",
            Capability::UpdateRfiStatus => "update_rfi_status",
            Capability::RespondToRfi => "respond_to_rfi",
            Capability::DeleteRfi => "delete_rfi",
            Capability::ExportRfis => "export_rfis",
            Capability::InviteUsers => "invite_users",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Capability {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Capability::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown permission: {}", s))
    }
}

/// Named category of user. Resolved per session from the `roles` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    ProjectManager,
    Contractor,
    ClientCollaborator,
    ViewOnly,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::ProjectManager,
        Role::Contractor,
        Role::ClientCollaborator,
        Role::ViewOnly,
    ];

    /// The capability table. This is the only place role semantics live.
    pub fn capabilities(&self) -> &'static [Capability] {
        use Capability::*;

        match self {
            Role::Admin => &Capability::ALL,
            Role::ProjectManager => &[
                ViewProjects,
                CreateProject,
                ViewRfis,
                CreateRfi,
                UpdateRfiStatus,
                RespondToRfi,
                DeleteRfi,
                ExportRfis,
            ],
            Role::Contractor => &[ViewProjects, ViewRfis, CreateRfi, RespondToRfi, ExportRfis],
            Role::ClientCollaborator => &[
                ViewProjects,
                ViewRfis,
                UpdateRfiStatus,
                RespondToRfi,
                ExportRfis,
            ],
            Role::ViewOnly => &[ViewProjects, ViewRfis, ExportRfis],
        }
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::ProjectManager => "project_manager",
            Role::Contractor => "contractor",
            Role::ClientCollaborator => "client_collaborator",
            Role::ViewOnly => "view_only",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Invalid role: {}", s))
    }
}
