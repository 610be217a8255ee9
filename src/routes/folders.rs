use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    attachments::items,
    error::AppResult,
    hierarchy::{self, aggregate},
    routes::clamp_page,
    state::AppState,
    types::{
        CloneFolderRequest, CreateFolderRequest, FolderQuantity, FolderTree, ItemCount, ItemDto,
        ListQuery, MoveFolderRequest, SubfolderCount, UpdateFolderRequest,
    },
};

pub async fn create_folder(
    State(state): State<AppState>,
    Json(req): Json<CreateFolderRequest>,
) -> AppResult<Response> {
    let folder = hierarchy::create_folder(&state.db, &req).await?;
    state.metrics.inc_folders_created();
    tracing::info!("Created folder {} ({})", folder.id, folder.name);
    Ok((StatusCode::CREATED, Json(folder)).into_response())
}

pub async fn get_folder(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<FolderTree>> {
    Ok(Json(hierarchy::get_folder(&state.db, id).await?))
}

pub async fn list_roots(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> AppResult<Json<Vec<FolderTree>>> {
    let (skip, limit) = clamp_page(&state, q.skip, q.limit);
    Ok(Json(hierarchy::list_roots(&state.db, skip, limit).await?))
}

pub async fn list_children(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<FolderTree>>> {
    Ok(Json(hierarchy::list_children(&state.db, id).await?))
}

pub async fn list_folder_items(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<ItemDto>>> {
    Ok(Json(items::list_folder_items(&state.db, id).await?))
}

pub async fn update_folder(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<UpdateFolderRequest>,
) -> AppResult<Json<FolderTree>> {
    Ok(Json(hierarchy::update_folder(&state.db, id, &patch).await?))
}

pub async fn delete_folder(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    hierarchy::delete_folder(&state.db, id).await?;
    state.metrics.inc_folders_deleted();
    tracing::info!("Deleted folder {} with its subtree", id);
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn move_folder(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(req): Query<MoveFolderRequest>,
) -> AppResult<Json<FolderTree>> {
    let folder = hierarchy::move_folder(&state.db, id, req.new_parent_id).await?;
    state.metrics.inc_folders_moved();
    Ok(Json(folder))
}

pub async fn clone_folder(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(req): Query<CloneFolderRequest>,
) -> AppResult<Response> {
    let suffix = state.config.clone.name_suffix.clone();
    let folder = hierarchy::clone_folder(&state.db, id, &req, &suffix).await?;
    state.metrics.inc_folders_cloned();
    tracing::info!("Cloned folder {} into new folder {}", id, folder.id);
    Ok((StatusCode::CREATED, Json(folder)).into_response())
}

pub async fn folder_quantity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<FolderQuantity>> {
    let total_quantity = aggregate::total_quantity(&state.db, Some(id)).await?;
    Ok(Json(FolderQuantity { folder_id: Some(id), total_quantity }))
}

pub async fn forest_quantity(State(state): State<AppState>) -> AppResult<Json<FolderQuantity>> {
    let total_quantity = aggregate::total_quantity(&state.db, None).await?;
    Ok(Json(FolderQuantity { folder_id: None, total_quantity }))
}

pub async fn folder_item_count(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ItemCount>> {
    let item_count = aggregate::item_count(&state.db, id).await?;
    Ok(Json(ItemCount { folder_id: id, item_count }))
}

pub async fn folder_subfolder_count(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<SubfolderCount>> {
    let subfolder_count = aggregate::subfolder_count(&state.db, id).await?;
    Ok(Json(SubfolderCount { folder_id: id, subfolder_count }))
}
