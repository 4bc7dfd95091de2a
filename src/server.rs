//! HTTP server initialization and runtime setup.
//!
//! Builds the accounting service client, the session layer and the Axum
//! server, and handles graceful shutdown.

use crate::application::services::AuthService;
use crate::config::Config;
use crate::infrastructure::{ExpiringMemoryStore, HttpTransport};
use crate::routes::{RouterOptions, app_router};
use crate::state::AppState;
use crate::web::session::SessionSettings;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// How often expired sessions are purged from memory.
const SESSION_REAP_PERIOD: Duration = Duration::from_secs(60);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - HTTP transport for the accounting service
/// - Authentication service
/// - Session store with its expiry reaper
/// - Session layer and routes
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - The accounting service endpoint is invalid
/// - The HTTP client cannot be built
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let endpoint = config.openair.endpoint_url()?;
    let transport = HttpTransport::new(endpoint, config.openair.timeout())
        .context("Failed to build accounting service client")?;
    tracing::info!("Accounting service client ready");

    let auth_service = Arc::new(AuthService::new(
        Arc::new(transport),
        config.openair.application(),
        config.openair.task_query(),
    ));

    let state = AppState::new(auth_service, config.openair.company.as_str());

    let store = ExpiringMemoryStore::new();
    let reaper = store.spawn_reaper(SESSION_REAP_PERIOD);

    let options = RouterOptions {
        session: SessionSettings {
            secret: config.session_secret.clone(),
            secure: config.secure_cookies,
            idle_timeout: config.session_idle_timeout(),
            store,
        },
        login_rate_limit: config.login_rate_limit,
        behind_proxy: config.behind_proxy,
        static_dir: config.static_dir.clone(),
    };

    let app = app_router(state, &options);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    reaper.abort();
    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
