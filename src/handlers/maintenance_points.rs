use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::AuthUser;
use crate::entities::{maintenance_point, maintenance_point_image};
use crate::services::maintenance_points::{NewMaintenancePoint, NewPointImage};
use crate::{ApiResponse, ApiResult, AppState};

#[utoipa::path(
    get,
    path = "/api/v1/assets/{id}/points",
    responses(
        (status = 200, description = "Maintenance point list returned"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn list_points(
    State(state): State<AppState>,
    Path(asset_id): Path<i32>,
) -> ApiResult<Vec<maintenance_point::Model>> {
    let points = state
        .services
        .maintenance_points
        .list_points(asset_id)
        .await?;
    Ok(Json(ApiResponse::success(points)))
}

#[utoipa::path(
    post,
    path = "/api/v1/assets/{id}/points",
    responses(
        (status = 200, description = "Maintenance point created"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn create_point(
    State(state): State<AppState>,
    user: AuthUser,
    Path(asset_id): Path<i32>,
    Json(input): Json<NewMaintenancePoint>,
) -> ApiResult<maintenance_point::Model> {
    let point = state
        .services
        .maintenance_points
        .create_point(asset_id, input, Some(user.user_id))
        .await?;
    Ok(Json(ApiResponse::success(point)))
}

/// Delete a maintenance point together with its images
#[utoipa::path(
    delete,
    path = "/api/v1/points/{id}",
    responses(
        (status = 204, description = "Maintenance point deleted"),
        (status = 404, description = "Maintenance point not found")
    )
)]
pub async fn delete_point(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(point_id): Path<i32>,
) -> Result<StatusCode, crate::errors::ServiceError> {
    state
        .services
        .maintenance_points
        .delete_point(point_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/points/{id}/images",
    responses(
        (status = 200, description = "Image list returned"),
        (status = 404, description = "Maintenance point not found")
    )
)]
pub async fn list_images(
    State(state): State<AppState>,
    Path(point_id): Path<i32>,
) -> ApiResult<Vec<maintenance_point_image::Model>> {
    let images = state
        .services
        .maintenance_points
        .list_images(point_id)
        .await?;
    Ok(Json(ApiResponse::success(images)))
}

#[utoipa::path(
    post,
    path = "/api/v1/points/{id}/images",
    responses(
        (status = 200, description = "Image attached"),
        (status = 404, description = "Maintenance point not found")
    )
)]
pub async fn add_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path(point_id): Path<i32>,
    Json(input): Json<NewPointImage>,
) -> ApiResult<maintenance_point_image::Model> {
    let image = state
        .services
        .maintenance_points
        .add_image(point_id, input, Some(user.user_id))
        .await?;
    Ok(Json(ApiResponse::success(image)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/points/{id}/images/{image_id}",
    responses(
        (status = 204, description = "Image deleted"),
        (status = 404, description = "Image not found on this point")
    )
)]
pub async fn delete_image(
    State(state): State<AppState>,
    _user: AuthUser,
    Path((point_id, image_id)): Path<(i32, i32)>,
) -> Result<StatusCode, crate::errors::ServiceError> {
    state
        .services
        .maintenance_points
        .delete_image(point_id, image_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
