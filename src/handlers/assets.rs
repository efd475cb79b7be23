use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::entities::{asset, maintenance_history};
use crate::services::assets::{NewAsset, NewMaintenance, UpdateAsset};
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

/// List assets, optionally filtered by a search term on name or location
#[utoipa::path(
    get,
    path = "/api/v1/assets",
    responses((status = 200, description = "Asset list returned"))
)]
pub async fn list_assets(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<asset::Model>> {
    let assets = state
        .services
        .assets
        .list_assets(query.search.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(assets)))
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/{id}",
    responses(
        (status = 200, description = "Asset returned"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn get_asset(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<asset::Model> {
    let asset = state.services.assets.get_asset(id).await?;
    Ok(Json(ApiResponse::success(asset)))
}

#[utoipa::path(
    post,
    path = "/api/v1/assets",
    responses(
        (status = 200, description = "Asset created"),
        (status = 400, description = "Invalid asset fields")
    )
)]
pub async fn create_asset(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(input): Json<NewAsset>,
) -> ApiResult<asset::Model> {
    let asset = state.services.assets.create_asset(input).await?;
    Ok(Json(ApiResponse::success(asset)))
}

#[utoipa::path(
    put,
    path = "/api/v1/assets/{id}",
    responses(
        (status = 200, description = "Asset updated"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn update_asset(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i32>,
    Json(input): Json<UpdateAsset>,
) -> ApiResult<asset::Model> {
    let asset = state.services.assets.update_asset(id, input).await?;
    Ok(Json(ApiResponse::success(asset)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/assets/{id}",
    responses(
        (status = 200, description = "Asset deleted"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn delete_asset(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, crate::errors::ServiceError> {
    state.services.assets.delete_asset(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Record an ad-hoc (corrective) maintenance job against an asset
#[utoipa::path(
    post,
    path = "/api/v1/assets/{id}/maintenance",
    responses(
        (status = 200, description = "Maintenance recorded"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn add_maintenance(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(input): Json<NewMaintenance>,
) -> ApiResult<maintenance_history::Model> {
    let history = state
        .services
        .assets
        .add_maintenance(id, input, Some(user.user_id))
        .await?;
    Ok(Json(ApiResponse::success(history)))
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/{id}/history",
    responses(
        (status = 200, description = "Maintenance history returned, newest first"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn asset_history(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<maintenance_history::Model>> {
    let history = state.services.assets.asset_history(id).await?;
    Ok(Json(ApiResponse::success(history)))
}
