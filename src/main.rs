use std::net::SocketAddr;

use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, patch, post},
    Router,
};
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Sqlite};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod attachments;
mod config;
mod db;
mod error;
mod hierarchy;
mod metrics;
mod routes;
mod state;
mod types;

use state::AppState;

const UI_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");
const UI_INDEX: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static/index.html");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging (stdout + tägliche Datei-Rotation unter ./logs)
    std::fs::create_dir_all("logs").ok();
    let (stdout_nb, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let file_appender = tracing_appender::rolling::daily("logs", "lagerwald.log");
    let (file_nb, file_guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(stdout_nb))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file_nb))
        .init();
    // Guards am Leben halten (nicht fallen lassen), damit Non-Blocking Writer korrekt flushen
    let _log_guards = (stdout_guard, file_guard);

    // Load configuration (embedded defaults -> lagerwald.toml -> env/.env)
    let app_cfg = config::load()?;

    // Prepare data dir (if sqlite)
    let db_url = &app_cfg.database.url;
    config::ensure_sqlite_parent_dir(db_url)?;
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        info!("Creating SQLite database at {}", db_url);
        Sqlite::create_database(db_url).await?;
    }
    let pool = SqlitePoolOptions::new()
        .max_connections(16)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                let _ = sqlx::query("PRAGMA foreign_keys=ON;").execute(&mut *conn).await;
                let _ = sqlx::query("PRAGMA busy_timeout=10000;").execute(&mut *conn).await;
                let _ = sqlx::query("PRAGMA temp_store=MEMORY;").execute(&mut *conn).await;
                Ok(())
            })
        })
        .connect(db_url)
        .await?;

    // Initialize DB schema
    db::init_db(&pool).await?;

    // App state
    let state = AppState::new(pool.clone(), app_cfg.clone());

    // Static file service für die Web UI mit Index-Fallback
    // Priorisiere Laufzeitpfad relativ zum Binary (<exe_dir>/static), fallback auf Build-Zeit-Pfade
    let (ui_root, ui_index) = {
        let runtime_ui = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|d| d.join("static")))
            .unwrap_or_else(|| std::path::PathBuf::from("static"));
        let runtime_index = runtime_ui.join("index.html");
        if runtime_ui.is_dir() && runtime_index.is_file() {
            (runtime_ui, runtime_index)
        } else {
            (std::path::PathBuf::from(UI_DIR), std::path::PathBuf::from(UI_INDEX))
        }
    };
    let static_ui_service = ServeDir::new(ui_root)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(ui_index));

    // Router
    let app = Router::new()
        .route("/healthz", get(routes::health::healthz))
        .route("/readyz", get(routes::health::readyz))
        .route("/metrics", get(routes::health::metrics))
        .route("/metrics/prometheus", get(routes::health::metrics_prometheus))
        .route("/version", get(routes::health::version))
        .route("/folders", post(routes::folders::create_folder).get(routes::folders::list_roots))
        .route("/folders/quantity", get(routes::folders::forest_quantity))
        .route(
            "/folders/{id}",
            get(routes::folders::get_folder)
                .patch(routes::folders::update_folder)
                .delete(routes::folders::delete_folder),
        )
        .route("/folders/{id}/move", patch(routes::folders::move_folder))
        .route("/folders/{id}/clone", post(routes::folders::clone_folder))
        .route("/folders/{id}/folders", get(routes::folders::list_children))
        .route("/folders/{id}/items", get(routes::folders::list_folder_items))
        .route("/folders/{id}/items/count", get(routes::folders::folder_item_count))
        .route("/folders/{id}/subfolders/count", get(routes::folders::folder_subfolder_count))
        .route("/folders/{id}/quantity", get(routes::folders::folder_quantity))
        .route("/items", post(routes::items::create_item).get(routes::items::list_items))
        .route(
            "/items/{id}",
            get(routes::items::get_item)
                .patch(routes::items::update_item)
                .delete(routes::items::delete_item),
        )
        .route("/items/{id}/move", patch(routes::items::move_item))
        .route("/items/{id}/clone", post(routes::items::clone_item))
        .route("/images", post(routes::images::create_image).get(routes::images::list_images))
        .route(
            "/images/{id}",
            get(routes::images::get_image)
                .patch(routes::images::update_image)
                .delete(routes::images::delete_image),
        )
        .route("/counts", get(routes::counts::get_counts))
        .fallback_service(static_ui_service)
        .with_state(state)
        // Globales Body-Limit (10 MB) – schützt vor übergroßen Requests
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    // CORS: in Debug permissiv (für lokale Entwicklung mit separater UI), in Release nicht nötig (same-origin)
    let app = if cfg!(debug_assertions) { app.layer(CorsLayer::permissive()) } else { app };

    // Server listen addr (from config)
    let port: u16 = app_cfg.server.port;
    let host: String = app_cfg.server.host.clone();
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid listen addr {}:{} - {}", host, port, e))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("LagerWald listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut term = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("Shutdown signal received. Stopping server...");
}
