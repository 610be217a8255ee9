use std::sync::Arc;

use crate::config::AppConfig;
use crate::metrics::Metrics;

/// The shared application state.
///
/// Holds the core shared resources that need to be accessed across HTTP
/// handlers. Cloneable for use with Axum's request extraction system; the
/// store handle is carried explicitly here, never as ambient global state.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool.
    ///
    /// Provides connections to the SQLite database holding the folder tree,
    /// items and image references.
    pub db: sqlx::SqlitePool,
    /// The application configuration.
    pub config: Arc<AppConfig>,
    /// The application metrics.
    pub metrics: Metrics,
}

impl AppState {
    /// Creates a new `AppState` with initialized components.
    pub fn new(db: sqlx::SqlitePool, config: AppConfig) -> Self {
        Self { db, config: Arc::new(config), metrics: Metrics::new() }
    }
}
