use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::entities::asset;
use crate::services::scheduler::{PerformPmOutcome, ScheduleEvent};
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct DueQuery {
    /// Reference date; defaults to today.
    pub as_of: Option<NaiveDate>,
    /// Horizon in days; defaults to the configured PM horizon.
    pub days: Option<i64>,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct PerformPmRequest {
    /// Date the PM was performed; defaults to today.
    pub as_of: Option<NaiveDate>,
}

/// Assets with PM due within the horizon, ascending by due date
#[utoipa::path(
    get,
    path = "/api/v1/pm/due",
    responses((status = 200, description = "Due asset list returned"))
)]
pub async fn list_due(
    State(state): State<AppState>,
    Query(query): Query<DueQuery>,
) -> ApiResult<Vec<asset::Model>> {
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let days = query.days.unwrap_or(state.config.pm_horizon_days);

    let assets = state
        .services
        .scheduler
        .list_due_within(as_of, days, None)
        .await?;
    Ok(Json(ApiResponse::success(assets)))
}

/// The calling technician's own due assets
#[utoipa::path(
    get,
    path = "/api/v1/pm/my-tasks",
    responses((status = 200, description = "Assigned due asset list returned"))
)]
pub async fn my_tasks(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<DueQuery>,
) -> ApiResult<Vec<asset::Model>> {
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let days = query.days.unwrap_or(state.config.pm_horizon_days);

    let assets = state
        .services
        .scheduler
        .list_due_within(as_of, days, Some(user.user_id))
        .await?;
    Ok(Json(ApiResponse::success(assets)))
}

/// Record a performed PM job and advance the asset's next due date
#[utoipa::path(
    post,
    path = "/api/v1/assets/{id}/perform-pm",
    responses(
        (status = 200, description = "PM performed and schedule advanced"),
        (status = 404, description = "Asset not found"),
        (status = 422, description = "Asset has no PM frequency configured")
    )
)]
pub async fn perform_pm(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(input): Json<PerformPmRequest>,
) -> ApiResult<PerformPmOutcome> {
    let as_of = input.as_of.unwrap_or_else(|| Utc::now().date_naive());

    let outcome = state
        .services
        .scheduler
        .perform_pm(id, as_of, Some(user.user_id))
        .await?;
    Ok(Json(ApiResponse::success(outcome)))
}

/// Calendar feed of scheduled preventive maintenance
#[utoipa::path(
    get,
    path = "/api/v1/pm/events",
    responses((status = 200, description = "Calendar event feed returned"))
)]
pub async fn schedule_events(State(state): State<AppState>) -> ApiResult<Vec<ScheduleEvent>> {
    let events = state.services.scheduler.schedule_event_feed().await?;
    Ok(Json(ApiResponse::success(events)))
}
