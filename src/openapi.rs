//! OpenAPI document for the HTTP surface.

use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

use crate::errors::ErrorResponse;
use crate::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Upkeep API",
        description = "Facility maintenance tracking: assets, PM scheduling, parts ledger and cost reports"
    ),
    paths(
        crate::handlers::assets::list_assets,
        crate::handlers::assets::get_asset,
        crate::handlers::assets::create_asset,
        crate::handlers::assets::update_asset,
        crate::handlers::assets::delete_asset,
        crate::handlers::assets::add_maintenance,
        crate::handlers::assets::asset_history,
        crate::handlers::scheduler::list_due,
        crate::handlers::scheduler::my_tasks,
        crate::handlers::scheduler::perform_pm,
        crate::handlers::scheduler::schedule_events,
        crate::handlers::parts::list_parts,
        crate::handlers::parts::list_low_stock,
        crate::handlers::parts::get_part,
        crate::handlers::parts::create_part,
        crate::handlers::parts::update_part,
        crate::handlers::parts::delete_part,
        crate::handlers::parts::record_transaction,
        crate::handlers::parts::transaction_history,
        crate::handlers::parts::use_part_for_maintenance,
        crate::handlers::maintenance_points::list_points,
        crate::handlers::maintenance_points::create_point,
        crate::handlers::maintenance_points::delete_point,
        crate::handlers::maintenance_points::list_images,
        crate::handlers::maintenance_points::add_image,
        crate::handlers::maintenance_points::delete_image,
        crate::handlers::reports::monthly_costs,
        crate::handlers::reports::job_types,
        crate::handlers::reports::export_history_csv,
        crate::handlers::users::register,
        crate::handlers::users::login,
        crate::handlers::users::list_users,
        crate::handlers::users::assign_role,
    ),
    components(schemas(ErrorResponse)),
    tags(
        (name = "upkeep-api", description = "Facility maintenance tracking API")
    )
)]
pub struct ApiDoc;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api-docs/openapi.json", get(serve_openapi))
}

async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
