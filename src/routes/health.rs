use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

// Health check endpoint - lightweight, no DB access
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

// Readiness probe: checks DB connectivity with timeout protection
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    // Add timeout to prevent hanging readiness checks
    let query = sqlx::query("SELECT 1").fetch_one(&state.db);
    match tokio::time::timeout(std::time::Duration::from_secs(5), query).await {
        Ok(Ok(_)) => (StatusCode::OK, "ready").into_response(),
        Ok(Err(e)) => (StatusCode::SERVICE_UNAVAILABLE, format!("not ready: {}", e)).into_response(),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "not ready: timeout").into_response(),
    }
}

// Metrics endpoint: returns JSON snapshot
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.metrics.get_snapshot();
    Json(snapshot)
}

// Prometheus-compatible text exposition format
pub async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    let m = state.metrics.get_snapshot();
    let body = format!(
        "# HELP lagerwald_folders_created Total folders created\n# TYPE lagerwald_folders_created counter\nlagerwald_folders_created {}\n\
# HELP lagerwald_folders_deleted Total folders deleted\n# TYPE lagerwald_folders_deleted counter\nlagerwald_folders_deleted {}\n\
# HELP lagerwald_folders_moved Total folders moved\n# TYPE lagerwald_folders_moved counter\nlagerwald_folders_moved {}\n\
# HELP lagerwald_folders_cloned Total folders cloned\n# TYPE lagerwald_folders_cloned counter\nlagerwald_folders_cloned {}\n\
# HELP lagerwald_items_created Total items created\n# TYPE lagerwald_items_created counter\nlagerwald_items_created {}\n\
# HELP lagerwald_items_deleted Total items deleted\n# TYPE lagerwald_items_deleted counter\nlagerwald_items_deleted {}\n\
# HELP lagerwald_items_cloned Total items cloned\n# TYPE lagerwald_items_cloned counter\nlagerwald_items_cloned {}\n\
# HELP lagerwald_images_created Total images created\n# TYPE lagerwald_images_created counter\nlagerwald_images_created {}\n\
# HELP lagerwald_images_deleted Total images deleted\n# TYPE lagerwald_images_deleted counter\nlagerwald_images_deleted {}\n\
# HELP lagerwald_uptime_seconds Uptime seconds\n# TYPE lagerwald_uptime_seconds gauge\nlagerwald_uptime_seconds {}\n",
        m.folders_created,
        m.folders_deleted,
        m.folders_moved,
        m.folders_cloned,
        m.items_created,
        m.items_deleted,
        m.items_cloned,
        m.images_created,
        m.images_deleted,
        m.uptime_seconds,
    );
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

// Version/Build info endpoint (JSON)
pub async fn version() -> impl IntoResponse {
    let body = serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "package": {
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "authors": env!("CARGO_PKG_AUTHORS"),
            "license": env!("CARGO_PKG_LICENSE"),
        },
        "build": {
            "profile": if cfg!(debug_assertions) { "debug" } else { "release" },
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
        }
    });
    (StatusCode::OK, Json(body))
}
