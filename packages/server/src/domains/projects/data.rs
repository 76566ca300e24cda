use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{ValidationErrors, Validator};
use crate::domains::projects::models::Project;

/// Project as returned to API clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    pub id: String,
    pub name: String,
    pub contract_number: String,
    pub client_company: String,
    pub pm_email: String,
    pub recipients: Vec<String>,
    pub disciplines: Vec<String>,
    pub default_urgent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Project> for ProjectData {
    fn from(project: Project) -> Self {
        Self {
            id: project.id.to_string(),
            name: project.name,
            contract_number: project.contract_number,
            client_company: project.client_company,
            pm_email: project.project_manager_email,
            recipients: project.standard_recipients,
            disciplines: project.disciplines,
            default_urgent: project.default_urgent,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

/// Body of `POST /api/projects`. Missing fields deserialize as empty so
/// validation can report every problem at once.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateProjectInput {
    pub name: String,
    pub contract_number: String,
    pub client_company: String,
    pub pm_email: String,
    pub recipients: Vec<String>,
    pub disciplines: Vec<String>,
    pub default_urgent: bool,
}

impl CreateProjectInput {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("name", &self.name, "Project name")
            .max_len("name", &self.name, 200)
            .required("contractNumber", &self.contract_number, "Contract number")
            .required("clientCompany", &self.client_company, "Client company")
            .required("pmEmail", &self.pm_email, "Project manager email")
            .email("pmEmail", &self.pm_email)
            .emails("recipients", &self.recipients)
            .finish()
    }

    /// Recipients trimmed, deduplicated case-insensitively, in input order.
    pub fn recipient_set(&self) -> Vec<String> {
        dedupe(&self.recipients, |s| s.to_lowercase())
    }

    pub fn discipline_set(&self) -> Vec<String> {
        dedupe(&self.disciplines, |s| s.to_string())
    }
}

fn dedupe(values: &[String], key: impl Fn(&str) -> String) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(key(v)))
        .map(str::to_string)
        .collect()
}
