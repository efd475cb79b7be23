pub mod assets;
pub mod maintenance_points;
pub mod parts;
pub mod reports;
pub mod scheduler;
pub mod users;

use crate::auth::AuthService;
use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub assets: Arc<crate::services::AssetService>,
    pub parts: Arc<crate::services::PartService>,
    pub scheduler: Arc<crate::services::SchedulerService>,
    pub reports: Arc<crate::services::ReportService>,
    pub maintenance_points: Arc<crate::services::MaintenancePointService>,
    pub users: Arc<crate::services::UserService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, auth: AuthService) -> Self {
        Self {
            assets: Arc::new(crate::services::AssetService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            parts: Arc::new(crate::services::PartService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            scheduler: Arc::new(crate::services::SchedulerService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            reports: Arc::new(crate::services::ReportService::new(db_pool.clone())),
            maintenance_points: Arc::new(crate::services::MaintenancePointService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            users: Arc::new(crate::services::UserService::new(
                db_pool,
                auth,
                event_sender,
            )),
        }
    }
}
