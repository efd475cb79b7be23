//! Upkeep API Library
//!
//! Facility-maintenance tracking service: assets, preventive-maintenance
//! scheduling, spare-parts inventory with an append-only stock ledger, and
//! maintenance cost reporting.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::{
    extract::State,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub auth: auth::AuthService,
    pub services: handlers::AppServices,
}

// Common response wrapper
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

// Full v1 API surface
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        // Status and health endpoints
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        // Assets API
        .route(
            "/assets",
            get(handlers::assets::list_assets).post(handlers::assets::create_asset),
        )
        .route(
            "/assets/:id",
            get(handlers::assets::get_asset)
                .put(handlers::assets::update_asset)
                .delete(handlers::assets::delete_asset),
        )
        .route(
            "/assets/:id/maintenance",
            post(handlers::assets::add_maintenance),
        )
        .route("/assets/:id/history", get(handlers::assets::asset_history))
        .route(
            "/assets/:id/history.csv",
            get(handlers::reports::export_history_csv),
        )
        // PM Scheduler API
        .route(
            "/assets/:id/perform-pm",
            post(handlers::scheduler::perform_pm),
        )
        .route("/pm/due", get(handlers::scheduler::list_due))
        .route("/pm/my-tasks", get(handlers::scheduler::my_tasks))
        .route("/pm/events", get(handlers::scheduler::schedule_events))
        // Parts / ledger API
        .route(
            "/parts",
            get(handlers::parts::list_parts).post(handlers::parts::create_part),
        )
        .route("/parts/low-stock", get(handlers::parts::list_low_stock))
        .route(
            "/parts/:id",
            get(handlers::parts::get_part)
                .put(handlers::parts::update_part)
                .delete(handlers::parts::delete_part),
        )
        .route(
            "/parts/:id/transactions",
            get(handlers::parts::transaction_history).post(handlers::parts::record_transaction),
        )
        .route(
            "/maintenance/:history_id/parts",
            post(handlers::parts::use_part_for_maintenance),
        )
        // Maintenance points API
        .route(
            "/assets/:id/points",
            get(handlers::maintenance_points::list_points)
                .post(handlers::maintenance_points::create_point),
        )
        .route(
            "/points/:id",
            delete(handlers::maintenance_points::delete_point),
        )
        .route(
            "/points/:id/images",
            get(handlers::maintenance_points::list_images)
                .post(handlers::maintenance_points::add_image),
        )
        .route(
            "/points/:id/images/:image_id",
            delete(handlers::maintenance_points::delete_image),
        )
        // Reports API
        .route("/reports/monthly-costs", get(handlers::reports::monthly_costs))
        .route("/reports/job-types", get(handlers::reports::job_types))
        // Users & auth API
        .route("/auth/register", post(handlers::users::register))
        .route("/auth/login", post(handlers::users::login))
        .route("/users", get(handlers::users::list_users))
        .route("/users/:id/role", put(handlers::users::assign_role))
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "service": "upkeep-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}

// Request logging middleware
pub async fn request_logging_middleware(
    request: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = status.as_u16(),
        elapsed_ms = duration.as_millis() as u64,
        "Request completed"
    );

    response
}

#[cfg(test)]
mod response_tests {
    use super::*;

    #[test]
    fn success_response_carries_data() {
        let response = ApiResponse::success(42);
        assert!(response.success);
        assert_eq!(response.data, Some(42));
        assert!(response.message.is_none());
    }

    #[test]
    fn error_response_carries_message() {
        let response = ApiResponse::<()>::error("oops".into());
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.message.as_deref(), Some("oops"));
    }
}
