use axum::{extract::{Path, State}, http::StatusCode, Json};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use models::asset::{self, NewAsset};
use service::assets as asset_service;

use crate::errors::JsonApiError;
use crate::routes::{AppState, WithUser};

#[derive(Debug, Deserialize)]
pub struct MetersInput {
    #[serde(default)]
    pub meter1: Option<f64>,
    #[serde(default)]
    pub meter2: Option<f64>,
    #[serde(default)]
    pub meter3: Option<f64>,
    #[serde(default)]
    pub meter4: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ActiveInput {
    pub is_active: bool,
}

#[utoipa::path(
    post, path = "/api/assets", tag = "assets",
    request_body = crate::openapi::NewAssetDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"))
)]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<WithUser<NewAsset>>,
) -> Result<(StatusCode, Json<asset::Model>), JsonApiError> {
    let m = asset_service::create_asset(&state.db, &input.body, input.user_id).await?;
    Ok((StatusCode::CREATED, Json(m)))
}

#[utoipa::path(
    get, path = "/api/assets/{id}", tag = "assets",
    params(("id" = Uuid, Path, description = "Asset ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<asset::Model>, JsonApiError> {
    Ok(Json(asset_service::get_asset(&state.db, id).await?))
}

/// Replaces all four readings; omitted meters are cleared.
#[utoipa::path(
    put, path = "/api/assets/{id}/meters", tag = "assets",
    params(("id" = Uuid, Path, description = "Asset ID")),
    request_body = crate::openapi::MetersDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn update_meters(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<MetersInput>,
) -> Result<Json<asset::Model>, JsonApiError> {
    let meters = [input.meter1, input.meter2, input.meter3, input.meter4];
    let m = asset_service::update_meters(&state.db, id, meters).await?;
    info!(id = %id, "meters updated via api");
    Ok(Json(m))
}

#[utoipa::path(
    put, path = "/api/assets/{id}/active", tag = "assets",
    params(("id" = Uuid, Path, description = "Asset ID")),
    responses((status = 200, description = "Updated"), (status = 404, description = "Not Found"))
)]
pub async fn set_active(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ActiveInput>,
) -> Result<Json<asset::Model>, JsonApiError> {
    Ok(Json(asset_service::set_asset_active(&state.db, id, input.is_active).await?))
}
