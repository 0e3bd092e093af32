use anyhow::Context;

use usersvc_infra::{ServiceConfig, UserStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    usersvc_observability::init();

    let config = ServiceConfig::from_env().context("invalid configuration")?;

    let services = usersvc_api::app::services::build_services(&config)
        .await
        .context("failed to initialize user store")?;
    let store = services.store().clone();
    let app = usersvc_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    store.shutdown().await;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
