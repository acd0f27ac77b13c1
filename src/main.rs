use anyhow::{Context, Result};
use std::{io::ErrorKind, sync::Arc};
use storage_gateway::{
    config::AppConfig,
    services::{gdrive::GoogleDriveProvider, registry::ProviderRegistry},
    state::AppState,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // --- Parse config ---
    let cfg = AppConfig::from_env_and_args()?;

    tracing::info!(
        "Starting storage-gateway on {} (default provider `{}`)",
        cfg.addr(),
        cfg.default_provider
    );

    // --- Register providers ---
    let mut registry = ProviderRegistry::new();
    match cfg.google_oauth() {
        Some(oauth) => {
            let google = GoogleDriveProvider::new(&oauth)
                .context("initializing Google Drive provider")?;
            registry.register(Arc::new(google))?;
        }
        None => tracing::warn!(
            "Google OAuth2 client id/secret not configured; the `google` provider is disabled"
        ),
    }
    if registry.get(&cfg.default_provider).is_none() {
        tracing::warn!(
            "default provider `{}` is not registered; cookie-only sessions will be rejected",
            cfg.default_provider
        );
    }

    // --- Build router ---
    let state = AppState::new(registry, cfg.default_provider.clone(), cfg.state_ttl);
    let app = storage_gateway::app(state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
