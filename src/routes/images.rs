use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    attachments::images,
    error::AppResult,
    routes::clamp_page,
    state::AppState,
    types::{CreateImageRequest, ImageDto, ImageListQuery, UpdateImageRequest},
};

pub async fn create_image(
    State(state): State<AppState>,
    Json(req): Json<CreateImageRequest>,
) -> AppResult<Response> {
    let image = images::create_image(&state.db, &req).await?;
    state.metrics.inc_images_created();
    Ok((StatusCode::CREATED, Json(image)).into_response())
}

pub async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ImageDto>> {
    Ok(Json(images::get_image(&state.db, id).await?))
}

pub async fn list_images(
    State(state): State<AppState>,
    Query(q): Query<ImageListQuery>,
) -> AppResult<Json<Vec<ImageDto>>> {
    let (skip, limit) = clamp_page(&state, q.skip, q.limit);
    Ok(Json(images::list_images(&state.db, q.item_id, q.folder_id, skip, limit).await?))
}

pub async fn update_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<UpdateImageRequest>,
) -> AppResult<Json<ImageDto>> {
    Ok(Json(images::update_image(&state.db, id, &patch).await?))
}

pub async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    images::delete_image(&state.db, id).await?;
    state.metrics.inc_images_deleted();
    Ok(StatusCode::NO_CONTENT.into_response())
}
