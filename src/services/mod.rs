pub mod assets;
pub mod maintenance_points;
pub mod parts;
pub mod reports;
pub mod scheduler;
pub mod users;

pub use assets::AssetService;
pub use maintenance_points::MaintenancePointService;
pub use parts::PartService;
pub use reports::ReportService;
pub use scheduler::SchedulerService;
pub use users::UserService;
