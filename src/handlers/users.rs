use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::auth::{AuthUser, TokenResponse};
use crate::entities::user::{self, UserRole};
use crate::services::users::{LoginRequest, RegisterUser};
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AssignRoleRequest {
    pub role: UserRole,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    responses(
        (status = 200, description = "User registered"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterUser>,
) -> ApiResult<user::Model> {
    let user = state.services.users.register(input).await?;
    Ok(Json(ApiResponse::success(user)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    responses(
        (status = 200, description = "Token issued"),
        (status = 401, description = "Invalid username or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> ApiResult<TokenResponse> {
    let token = state.services.users.login(input).await?;
    Ok(Json(ApiResponse::success(token)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses((status = 200, description = "User list returned"))
)]
pub async fn list_users(
    State(state): State<AppState>,
    _user: AuthUser,
) -> ApiResult<Vec<user::Model>> {
    let users = state.services.users.list_users().await?;
    Ok(Json(ApiResponse::success(users)))
}

/// Admin-only role assignment
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/role",
    responses(
        (status = 200, description = "Role assigned"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "User not found")
    )
)]
pub async fn assign_role(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(id): Path<i32>,
    Json(input): Json<AssignRoleRequest>,
) -> ApiResult<user::Model> {
    let user = state
        .services
        .users
        .assign_role(id, input.role, &actor)
        .await?;
    Ok(Json(ApiResponse::success(user)))
}
