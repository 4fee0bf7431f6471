use std::{net::SocketAddr, sync::Arc};

use axum::{
    routing::{get, post},
    Router,
};
use storage::Storage;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info};

mod app_state;
mod config;
mod pages;
mod routes;

use app_state::AppState;
use config::load_settings;

/// Commands are short; anything bigger than this is not a command.
const MAX_BODY_BYTES: usize = 16 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let database_url = settings.sqlite_url();
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(%database_url, %error, "failed to open command log database");
        error
    })?;

    let app = build_router(Arc::new(AppState { storage }));

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, "homepage listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("homepage stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
    }
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/scratchpad.html", get(pages::scratchpad))
        .route("/calculator.html", get(pages::calculator))
        .route("/password.html", get(pages::password))
        .route("/static/js/task.js", get(pages::task_script))
        .route("/store_command", post(routes::store_command))
        .route("/commands", get(routes::list_commands))
        .route("/healthz", get(routes::healthz))
        .fallback(routes::not_found)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
