// Main entry point for the RFI tracker API server

use std::sync::Arc;

use anyhow::{Context, Result};
use rfi_core::kernel::{BasePdfRenderer, HtmlPreviewRenderer, RemotePdfRenderer, ServerDeps, SupabaseAdapter};
use rfi_core::server::{build_app, AppOptions, RateLimit};
use rfi_core::Config;
use supabase::{SupabaseOptions, SupabaseService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rfi_core=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting RFI tracker API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Hosted backend client (rows + auth)
    let supabase = Arc::new(
        SupabaseService::new(
            SupabaseOptions::new(&config.supabase_url, &config.supabase_service_role_key)
                .with_timeout(config.backend_timeout),
        )
        .context("Failed to create backend client")?,
    );
    let adapter = Arc::new(SupabaseAdapter::new(supabase));

    let pdf_renderer: Arc<dyn BasePdfRenderer> = match &config.pdf_render_url {
        Some(url) => {
            tracing::info!(url = %url, "Using remote PDF renderer");
            Arc::new(RemotePdfRenderer::new(url.clone()))
        }
        None => Arc::new(HtmlPreviewRenderer::new()),
    };

    let deps = ServerDeps::new(adapter.clone(), adapter, pdf_renderer, config.notice_ttl);

    let app = build_app(
        deps,
        AppOptions {
            allowed_origins: config.allowed_origins.clone(),
            rate_limit: Some(RateLimit {
                per_second: config.rate_limit_per_second,
                burst: config.rate_limit_burst,
            }),
        },
    );

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
