//! Export domain - PDF previews of RFI records
//!
//! The renderer is an external collaborator; this module only authorizes
//! the caller and checks that one preview came back per record, in order.

use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use crate::common::{AuthError, Capability, SessionContext};
use crate::kernel::{PdfPreview, ServerDeps};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Permission(#[from] AuthError),

    #[error("Failed to generate PDF previews")]
    Render(#[source] anyhow::Error),
}

pub async fn render_previews(
    rfis: &[Value],
    session: &SessionContext,
    deps: &ServerDeps,
) -> Result<Vec<PdfPreview>, ExportError> {
    let user = session.require(Capability::ExportRfis)?;

    let previews = deps.pdf_renderer.render_previews(rfis).await.map_err(|e| {
        error!(error = %e, count = rfis.len(), "PDF preview rendering failed");
        ExportError::Render(e)
    })?;

    if previews.len() != rfis.len() {
        error!(
            expected = rfis.len(),
            got = previews.len(),
            "Renderer returned the wrong number of previews"
        );
        return Err(ExportError::Render(anyhow::anyhow!(
            "expected {} previews, got {}",
            rfis.len(),
            previews.len()
        )));
    }

    info!(user_id = %user.id, count = previews.len(), "PDF previews rendered");
    Ok(previews)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Role, SessionUser, UserId};
    use crate::kernel::test_dependencies::{MockPdfRenderer, TestDependencies};
    use serde_json::json;

    fn session(role: Role) -> SessionContext {
        SessionContext::started(SessionUser {
            id: UserId::new(),
            email: "viewer@example.com".into(),
            full_name: None,
        })
        .with_role(role)
    }

    #[tokio::test]
    async fn test_view_only_may_export() {
        let test_deps = TestDependencies::new();
        let deps = test_deps.server_deps();
        let rfis = vec![json!({"id": "a", "rfiNumber": "RFI-001", "title": "Door"})];

        let previews = render_previews(&rfis, &session(Role::ViewOnly), &deps)
            .await
            .unwrap();
        assert_eq!(previews.len(), 1);
        assert_eq!(test_deps.pdf_renderer.calls(), vec![1]);
    }

    #[tokio::test]
    async fn test_renderer_failure_is_a_render_error() {
        let test_deps = TestDependencies::new().with_pdf_renderer(MockPdfRenderer::failing());
        let deps = test_deps.server_deps();

        let err = render_previews(&[json!({})], &session(Role::Admin), &deps)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Render(_)));
        assert_eq!(err.to_string(), "Failed to generate PDF previews");
    }

    #[tokio::test]
    async fn test_signed_out_cannot_export() {
        let deps = TestDependencies::new().server_deps();
        let err = render_previews(&[], &SessionContext::anonymous(), &deps)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExportError::Permission(AuthError::AuthenticationRequired)
        ));
    }
}
