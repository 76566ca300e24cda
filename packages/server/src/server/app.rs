//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::kernel::ServerDeps;
use crate::server::middleware::session_auth_middleware;
use crate::server::routes::{
    add_response_handler, create_project_handler, create_rfi_handler, delete_rfi_handler,
    dismiss_notice_handler, get_rfi_handler, health_handler, invite_user_handler,
    list_notices_handler, list_projects_handler, list_rfis_handler, pdf_previews_handler,
    session_handler, sign_out_handler, update_status_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: ServerDeps,
}

/// Per-IP request budget.
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    pub per_second: u64,
    pub burst: u32,
}

#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Empty allows any origin.
    pub allowed_origins: Vec<String>,
    /// Needs connect info on the listener; leave unset when there is none.
    pub rate_limit: Option<RateLimit>,
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

/// Build the Axum application router
pub fn build_app(deps: ServerDeps, options: AppOptions) -> Router {
    let app_state = AppState { deps };

    let api = Router::new()
        .route(
            "/api/projects",
            post(create_project_handler).get(list_projects_handler),
        )
        .route("/api/rfis", post(create_rfi_handler).get(list_rfis_handler))
        .route("/api/rfis/:id", get(get_rfi_handler).delete(delete_rfi_handler))
        .route("/api/rfis/:id/status", patch(update_status_handler))
        .route("/api/rfis/:id/responses", post(add_response_handler))
        .route("/api/admin/invite-user", post(invite_user_handler))
        .route("/api/export/pdf-previews", post(pdf_previews_handler))
        .route("/api/session", get(session_handler).delete(sign_out_handler))
        .route("/api/notices", get(list_notices_handler))
        .route("/api/notices/:id", delete(dismiss_notice_handler))
        .layer(middleware::from_fn(session_auth_middleware));

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .merge(api);

    if let Some(limit) = options.rate_limit {
        match GovernorConfigBuilder::default()
            .per_second(limit.per_second)
            .burst_size(limit.burst)
            .use_headers()
            .finish()
        {
            Some(config) => {
                router = router.layer(GovernorLayer {
                    config: Arc::new(config),
                });
            }
            None => warn!(?limit, "Invalid rate limit, serving without one"),
        }
    }

    router
        .layer(Extension(app_state))
        .layer(cors_layer(&options.allowed_origins))
        .layer(TraceLayer::new_for_http())
}
