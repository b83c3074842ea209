use api_router::{api_routes_v1, api_state::ApiState};
use axum::Router;
use common::{
    storage::{db::SurrealDbClient, workspace::WorkspaceRoot},
    utils::config::{get_config, AppConfig, LogFormat},
};
use std::sync::Arc;
use tokio::task::LocalSet;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use transcode_pipeline::{
    run_worker_loop, TranscodeConfig, TranscodePipeline, TranscodeQueue, TranscodeServices,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Get config
    let config = get_config()?;

    // Set up tracing
    init_tracing(config.log_format);

    let db = Arc::new(connect_db(&config).await?);

    let workspaces = WorkspaceRoot::new(config.workspace_root());
    tokio::fs::create_dir_all(workspaces.path()).await?;
    info!(root = %workspaces.path().display(), "Workspace root ready");

    let pipeline = Arc::new(TranscodePipeline::new(
        Arc::clone(&db),
        workspaces,
        TranscodeConfig::from_app_config(&config),
        TranscodeServices::ffmpeg(&config),
    ));
    let (queue, receiver) = TranscodeQueue::new(config.queue_capacity);

    let api_state = ApiState::new(db, &config, Arc::clone(&pipeline), queue);
    let app = build_app(api_state);

    let serve_address = config.bind_address();
    info!("Starting server listening on {}", serve_address);
    let listener = tokio::net::TcpListener::bind(&serve_address).await?;

    // The worker stays on this thread, requests are served from the runtime's pool
    let local = LocalSet::new();
    local.spawn_local(async move {
        info!("Starting transcode worker");
        run_worker_loop(receiver, pipeline).await;
    });

    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    });

    match local.run_until(server).await {
        Ok(Ok(())) => info!("Server stopped; draining queued jobs"),
        Ok(Err(e)) => error!("Server error: {}", e),
        Err(e) => error!("Server task panicked: {:?}", e),
    }

    // The router owned the last queue sender, so the worker exits once drained
    local.await;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };
    installed.ok();
}

async fn connect_db(config: &AppConfig) -> Result<SurrealDbClient, surrealdb::Error> {
    let credentials = config
        .surrealdb_username
        .as_deref()
        .zip(config.surrealdb_password.as_deref());

    SurrealDbClient::new(
        &config.surrealdb_address,
        credentials,
        &config.surrealdb_namespace,
        &config.surrealdb_database,
    )
    .await
}

fn build_app(api_state: ApiState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes_v1(&api_state))
        .with_state(api_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
