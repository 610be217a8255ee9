use axum::{extract::State, Json};

use crate::{error::AppResult, hierarchy::aggregate, state::AppState, types::CountsDto};

/// Realtime counters over the whole forest.
pub async fn get_counts(State(state): State<AppState>) -> AppResult<Json<CountsDto>> {
    Ok(Json(aggregate::realtime_counts(&state.db).await?))
}
