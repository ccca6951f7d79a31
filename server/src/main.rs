use anyhow::Context;
use tablebridge_server::{
    app, app_with_static, logging, run, AppState, RemoteDataClient, ServerConfig,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init_logging();

    let config = ServerConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        remote = %config.remote.base_url(),
        digest = %config.remote.digest(),
        strict_mutations = config.remote.strict_mutations(),
        "configuration loaded"
    );

    let state = AppState::new(RemoteDataClient::new(config.remote.clone()));
    let router = match &config.static_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "serving static files");
            app_with_static(state, dir)
        }
        None => app(state),
    };

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(address = %listener.local_addr()?, "listening");

    run(listener, router).await?;
    tracing::info!("shutdown complete");
    Ok(())
}
