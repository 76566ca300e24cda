use axum::{
    extract::{Extension, Request},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::common::SessionContext;
use crate::domains::users::actions::resolve_session;
use crate::server::app::AppState;

/// Middleware to resolve the caller's session
///
/// This middleware:
/// 1. Extracts the access token from the Authorization header
/// 2. Resolves it through the auth service, then looks up the role
/// 3. Stores a `SessionContext` in request extensions
///
/// Note: This middleware does NOT block requests. Missing or invalid tokens
/// give an anonymous session, and a token that could not be checked gives a
/// pending one; handlers decide what needs authentication.
pub async fn session_auth_middleware(
    Extension(state): Extension<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = match bearer_token(&request) {
        Some(token) => match resolve_session(&token, &state.deps).await {
            Ok(Some(session)) => session,
            Ok(None) => {
                debug!("Invalid or expired access token");
                SessionContext::anonymous()
            }
            Err(e) => {
                warn!(error = %e, "Session lookup failed, role left pending");
                SessionContext::unverified()
            }
        },
        None => SessionContext::anonymous(),
    };

    request.extensions_mut().insert(session);
    next.run(request).await
}

/// Token from `Authorization: Bearer <token>`.
fn bearer_token(request: &Request) -> Option<String> {
    let header = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(header: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/api/projects");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(bearer_token(&request(Some("Bearer abc123"))).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_missing_or_malformed_header() {
        assert_eq!(bearer_token(&request(None)), None);
        assert_eq!(bearer_token(&request(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&request(Some("Bearer "))), None);
    }
}
