//! Router assembly and the serve loop.

use std::path::Path;

use axum::routing::{get, post, put};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::remote::RemoteDataClient;

/// Read-only state shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub remote: RemoteDataClient,
}

impl AppState {
    pub fn new(remote: RemoteDataClient) -> Self {
        Self { remote }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/data", get(handlers::list_data).post(handlers::add_data))
        .route(
            "/data/{id}",
            put(handlers::update_data).delete(handlers::delete_data),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `app` plus a static file fallback rooted at `dir`.
pub fn app_with_static(state: AppState, dir: &Path) -> Router {
    app(state).fallback_service(ServeDir::new(dir))
}

pub async fn run(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
