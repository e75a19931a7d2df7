use anyhow::Context;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use goldwatch::api::create_router;
use goldwatch::config::AppConfig;
use goldwatch::engine::Engine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("goldwatch=info")),
        )
        .init();

    let env = std::env::var("GOLDWATCH_ENV").unwrap_or_else(|_| "default".to_string());
    let config = AppConfig::load(&env).context("loading configuration")?;

    let engine = Engine::new(config.clone()).context("building engine")?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    info!("fetching initial data");
    engine.initial_fetch().await;

    let monitors = engine.spawn_monitors(shutdown_rx);

    let app = create_router(engine.api_state());
    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("binding {}", config.server.bind))?;
    info!(bind = %config.server.bind, "api server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("interrupt signal, shutting down");
            let _ = shutdown_tx.send(true);
        })
        .await
        .context("serving api")?;

    for monitor in monitors {
        let _ = monitor.await;
    }
    info!("shutdown complete");
    Ok(())
}
