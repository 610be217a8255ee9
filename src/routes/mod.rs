//! HTTP route handlers for the LagerWald API.
//!
//! Thin handlers only: request extraction, pagination clamping, metrics and
//! status codes. All tree semantics live in the engine modules:
//!
//! - `folders`: folder tree operations (create, subtree fetch, move, clone,
//!   cascade delete) and per-folder aggregates
//! - `items`: item lifecycle endpoints
//! - `images`: image reference endpoints
//! - `counts`: forest-wide realtime counters
//! - `health`: health check and system status endpoints

pub mod counts;
pub mod folders;
pub mod health;
pub mod images;
pub mod items;

use crate::state::AppState;

/// Clamps offset/limit against the configured pagination bounds.
pub(crate) fn clamp_page(
    state: &AppState,
    skip: Option<i64>,
    limit: Option<i64>,
) -> (i64, i64) {
    let cfg = &state.config.pagination;
    let skip = skip.unwrap_or(0).max(0);
    let limit = limit.unwrap_or(cfg.default_limit).clamp(1, cfg.max_limit);
    (skip, limit)
}
