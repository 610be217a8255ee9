use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    attachments::items,
    error::AppResult,
    routes::clamp_page,
    state::AppState,
    types::{
        CloneItemRequest, CreateItemRequest, ItemDto, ItemListQuery, MoveItemRequest,
        UpdateItemRequest,
    },
};

pub async fn create_item(
    State(state): State<AppState>,
    Json(req): Json<CreateItemRequest>,
) -> AppResult<Response> {
    let item = items::create_item(&state.db, &req).await?;
    state.metrics.inc_items_created();
    tracing::info!("Created item {} ({})", item.id, item.name);
    Ok((StatusCode::CREATED, Json(item)).into_response())
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ItemDto>> {
    Ok(Json(items::get_item(&state.db, id).await?))
}

pub async fn list_items(
    State(state): State<AppState>,
    Query(q): Query<ItemListQuery>,
) -> AppResult<Json<Vec<ItemDto>>> {
    let (skip, limit) = clamp_page(&state, q.skip, q.limit);
    Ok(Json(items::list_items(&state.db, q.folder_id, skip, limit).await?))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<UpdateItemRequest>,
) -> AppResult<Json<ItemDto>> {
    Ok(Json(items::update_item(&state.db, id, &patch).await?))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    items::delete_item(&state.db, id).await?;
    state.metrics.inc_items_deleted();
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn move_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(req): Query<MoveItemRequest>,
) -> AppResult<Json<ItemDto>> {
    Ok(Json(items::move_item(&state.db, id, req.new_folder_id).await?))
}

pub async fn clone_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(req): Query<CloneItemRequest>,
) -> AppResult<Response> {
    let suffix = state.config.clone.name_suffix.clone();
    let item = items::clone_item(&state.db, id, req.new_folder_id, &suffix).await?;
    state.metrics.inc_items_cloned();
    tracing::info!("Cloned item {} into new item {}", id, item.id);
    Ok((StatusCode::CREATED, Json(item)).into_response())
}
