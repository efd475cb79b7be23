use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::errors::ServiceError;
use crate::services::reports::{JobTypeBreakdown, MonthlyCost};
use crate::{ApiResponse, ApiResult, AppState};

/// Maintenance spend per calendar month, ascending
#[utoipa::path(
    get,
    path = "/api/v1/reports/monthly-costs",
    responses((status = 200, description = "Monthly cost totals returned"))
)]
pub async fn monthly_costs(State(state): State<AppState>) -> ApiResult<Vec<MonthlyCost>> {
    let totals = state.services.reports.monthly_cost_totals().await?;
    Ok(Json(ApiResponse::success(totals)))
}

/// PM vs corrective job counts
#[utoipa::path(
    get,
    path = "/api/v1/reports/job-types",
    responses((status = 200, description = "Job type breakdown returned"))
)]
pub async fn job_types(State(state): State<AppState>) -> ApiResult<JobTypeBreakdown> {
    let breakdown = state.services.reports.job_type_breakdown().await?;
    Ok(Json(ApiResponse::success(breakdown)))
}

/// Download an asset's maintenance history as CSV
#[utoipa::path(
    get,
    path = "/api/v1/assets/{id}/history.csv",
    responses(
        (status = 200, description = "CSV export returned"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn export_history_csv(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    let csv = state.services.reports.export_history_csv(id).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"maintenance_history.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}
