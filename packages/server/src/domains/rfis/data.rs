use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{ValidationErrors, Validator};
use crate::domains::rfis::models::{Attachment, Rfi, RfiResponse, RfiStatus, Urgency};

// ============================================================================
// Output types
// ============================================================================

/// RFI as returned to API clients and handed to the PDF renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfiData {
    pub id: String,
    pub project_id: String,
    pub rfi_number: String,
    pub title: String,
    pub description: String,
    pub status: RfiStatus,
    pub urgency: Urgency,
    pub discipline: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub created_by: String,
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub attachments: Vec<AttachmentData>,
    #[serde(default)]
    pub responses: Vec<RfiResponseData>,
}

impl RfiData {
    /// Attach responses and attachments. Files that came with a response
    /// are listed under that response, the rest under the RFI.
    pub fn with_children(mut self, responses: Vec<RfiResponse>, attachments: Vec<Attachment>) -> Self {
        let (on_responses, on_rfi): (Vec<_>, Vec<_>) =
            attachments.into_iter().partition(|a| a.response_id.is_some());

        self.attachments = on_rfi.into_iter().map(AttachmentData::from).collect();
        self.responses = responses
            .into_iter()
            .map(|response| {
                let files = on_responses
                    .iter()
                    .filter(|a| a.response_id == Some(response.id))
                    .cloned()
                    .map(AttachmentData::from)
                    .collect();
                RfiResponseData::from(response).with_attachments(files)
            })
            .collect();
        self
    }
}

impl From<Rfi> for RfiData {
    fn from(rfi: Rfi) -> Self {
        Self {
            id: rfi.id.to_string(),
            project_id: rfi.project_id.to_string(),
            rfi_number: rfi.rfi_number,
            title: rfi.title,
            description: rfi.description,
            status: rfi.status,
            urgency: rfi.urgency,
            discipline: rfi.discipline,
            due_date: rfi.due_date,
            created_by: rfi.created_by.to_string(),
            assigned_to: rfi.assigned_to.map(|id| id.to_string()),
            created_at: rfi.created_at,
            updated_at: rfi.updated_at,
            attachments: Vec::new(),
            responses: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfiResponseData {
    pub id: String,
    pub rfi_id: String,
    pub content: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub attachments: Vec<AttachmentData>,
}

impl RfiResponseData {
    fn with_attachments(mut self, attachments: Vec<AttachmentData>) -> Self {
        self.attachments = attachments;
        self
    }
}

impl From<RfiResponse> for RfiResponseData {
    fn from(response: RfiResponse) -> Self {
        Self {
            id: response.id.to_string(),
            rfi_id: response.rfi_id.to_string(),
            content: response.content,
            created_by: response.created_by.to_string(),
            created_at: response.created_at,
            attachments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentData {
    pub id: String,
    pub file_name: String,
    pub file_url: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Attachment> for AttachmentData {
    fn from(attachment: Attachment) -> Self {
        Self {
            id: attachment.id.to_string(),
            file_name: attachment.file_name,
            file_url: attachment.file_url,
            content_type: attachment.content_type,
            size_bytes: attachment.size_bytes,
            created_at: attachment.created_at,
        }
    }
}

// ============================================================================
// Input types
// ============================================================================

/// A file already uploaded to backend storage.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewAttachment {
    pub file_name: String,
    pub file_url: String,
    pub content_type: String,
    pub size_bytes: i64,
}

fn validate_attachments(validator: &mut Validator, attachments: &[NewAttachment]) {
    for (index, attachment) in attachments.iter().enumerate() {
        let field = format!("attachments[{}]", index);
        if attachment.file_name.trim().is_empty() || attachment.file_url.trim().is_empty() {
            validator.error(&field, "Attachment needs a file name and URL");
        }
        if attachment.size_bytes < 0 {
            validator.error(&field, "Attachment size cannot be negative");
        }
    }
}

/// Body of `POST /api/rfis`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateRfiInput {
    pub project_id: String,
    pub title: String,
    pub description: String,
    /// Overrides the project's default urgency when present.
    pub urgency: Option<Urgency>,
    pub discipline: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<String>,
    pub attachments: Vec<NewAttachment>,
}

impl CreateRfiInput {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut validator = Validator::new();
        validator
            .required("projectId", &self.project_id, "Project")
            .required("title", &self.title, "Title")
            .max_len("title", &self.title, 200)
            .required("description", &self.description, "Description");

        if !self.project_id.trim().is_empty() && self.project_id.trim().parse::<uuid::Uuid>().is_err() {
            validator.error("projectId", "Invalid project id");
        }
        if let Some(assignee) = &self.assigned_to {
            if assignee.trim().parse::<uuid::Uuid>().is_err() {
                validator.error("assignedTo", "Invalid user id");
            }
        }
        validate_attachments(&mut validator, &self.attachments);
        validator.finish()
    }
}

/// Body of `PATCH /api/rfis/{id}/status`
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusInput {
    pub status: RfiStatus,
}

/// Body of `POST /api/rfis/{id}/responses`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddResponseInput {
    pub content: String,
    pub attachments: Vec<NewAttachment>,
}

impl AddResponseInput {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut validator = Validator::new();
        validator
            .required("content", &self.content, "Response")
            .max_len("content", &self.content, 10_000);
        validate_attachments(&mut validator, &self.attachments);
        validator.finish()
    }
}
