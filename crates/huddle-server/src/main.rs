mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use huddle_api::auth::{AppState, AppStateInner};
use huddle_api::directory::SqliteDirectory;
use huddle_api::routes;
use huddle_core::snapshot::{persist_once, run_snapshot_loop};
use huddle_core::{Scheduler, SnapshotSink, Store, SystemClock};
use huddle_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "huddle=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database and restore the last snapshot
    let db = Arc::new(Database::open(&config.db_path)?);
    let directory = Arc::new(SqliteDirectory::new(db.clone(), &config.jwt_secret));
    let store = Arc::new(match db.load_latest_snapshot()? {
        Some(snapshot) => Store::from_snapshot(directory, Arc::new(SystemClock), snapshot),
        None => Store::new(directory, Arc::new(SystemClock)),
    });

    // Background snapshot task
    let sink: Arc<dyn SnapshotSink> = db.clone();
    tokio::spawn(run_snapshot_loop(store.clone(), sink.clone(), config.snapshot_interval_secs));

    let app_state: AppState = Arc::new(AppStateInner {
        db,
        scheduler: Scheduler::new(store.clone()),
        store: store.clone(),
        jwt_secret: config.jwt_secret.clone(),
    });

    let app = routes::router(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Huddle server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Final snapshot so nothing since the last tick is lost
    if let Err(e) = persist_once(store, sink).await {
        warn!("Final snapshot failed: {}", e);
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
