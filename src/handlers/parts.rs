use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::entities::{part, parts_transaction};
use crate::services::parts::{NewPart, NewTransaction, TransactionOutcome, UpdatePart};
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UsePartRequest {
    pub part_id: i32,
    pub quantity: i32,
    pub notes: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/parts",
    responses((status = 200, description = "Part list returned"))
)]
pub async fn list_parts(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<part::Model>> {
    let parts = state
        .services
        .parts
        .list_parts(query.search.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(parts)))
}

/// Parts at or below their minimum stock level
#[utoipa::path(
    get,
    path = "/api/v1/parts/low-stock",
    responses((status = 200, description = "Low-stock part list returned"))
)]
pub async fn list_low_stock(State(state): State<AppState>) -> ApiResult<Vec<part::Model>> {
    let parts = state.services.parts.list_low_stock().await?;
    Ok(Json(ApiResponse::success(parts)))
}

#[utoipa::path(
    get,
    path = "/api/v1/parts/{id}",
    responses(
        (status = 200, description = "Part returned"),
        (status = 404, description = "Part not found")
    )
)]
pub async fn get_part(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<part::Model> {
    let part = state.services.parts.get_part(id).await?;
    Ok(Json(ApiResponse::success(part)))
}

#[utoipa::path(
    post,
    path = "/api/v1/parts",
    responses(
        (status = 200, description = "Part created"),
        (status = 409, description = "Part number already exists")
    )
)]
pub async fn create_part(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<NewPart>,
) -> ApiResult<part::Model> {
    let part = state
        .services
        .parts
        .create_part(input, Some(user.user_id))
        .await?;
    Ok(Json(ApiResponse::success(part)))
}

#[utoipa::path(
    put,
    path = "/api/v1/parts/{id}",
    responses(
        (status = 200, description = "Part updated"),
        (status = 404, description = "Part not found"),
        (status = 409, description = "Part number already exists")
    )
)]
pub async fn update_part(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i32>,
    Json(input): Json<UpdatePart>,
) -> ApiResult<part::Model> {
    let part = state.services.parts.update_part(id, input).await?;
    Ok(Json(ApiResponse::success(part)))
}

/// Delete a part and its ledger. Refused while maintenance records still
/// reference the part.
#[utoipa::path(
    delete,
    path = "/api/v1/parts/{id}",
    responses(
        (status = 204, description = "Part deleted"),
        (status = 404, description = "Part not found"),
        (status = 409, description = "Part still referenced by maintenance records")
    )
)]
pub async fn delete_part(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, crate::errors::ServiceError> {
    state.services.parts.delete_part(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Append a stock transaction to a part's ledger
#[utoipa::path(
    post,
    path = "/api/v1/parts/{id}/transactions",
    responses(
        (status = 200, description = "Transaction recorded"),
        (status = 400, description = "Invalid quantity"),
        (status = 404, description = "Part not found")
    )
)]
pub async fn record_transaction(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(input): Json<NewTransaction>,
) -> ApiResult<TransactionOutcome> {
    let outcome = state
        .services
        .parts
        .record_transaction(id, input, Some(user.user_id))
        .await?;
    Ok(Json(ApiResponse::success(outcome)))
}

#[utoipa::path(
    get,
    path = "/api/v1/parts/{id}/transactions",
    responses(
        (status = 200, description = "Transaction ledger returned, newest first"),
        (status = 404, description = "Part not found")
    )
)]
pub async fn transaction_history(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<parts_transaction::Model>> {
    let transactions = state.services.parts.transaction_history(id).await?;
    Ok(Json(ApiResponse::success(transactions)))
}

/// Consume a part for a maintenance job: usage row plus `out` ledger entry
#[utoipa::path(
    post,
    path = "/api/v1/maintenance/{history_id}/parts",
    responses(
        (status = 200, description = "Part usage recorded"),
        (status = 400, description = "Invalid quantity"),
        (status = 404, description = "Maintenance record or part not found")
    )
)]
pub async fn use_part_for_maintenance(
    State(state): State<AppState>,
    user: AuthUser,
    Path(history_id): Path<i32>,
    Json(input): Json<UsePartRequest>,
) -> ApiResult<TransactionOutcome> {
    let outcome = state
        .services
        .parts
        .use_part_for_maintenance(
            history_id,
            input.part_id,
            input.quantity,
            input.notes,
            Some(user.user_id),
        )
        .await?;
    Ok(Json(ApiResponse::success(outcome)))
}
