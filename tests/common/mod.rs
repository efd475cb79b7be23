use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use tokio::sync::mpsc;

use upkeep_api::auth::{AuthConfig, AuthService};
use upkeep_api::config::AppConfig;
use upkeep_api::db::DbPool;
use upkeep_api::events::{self, EventSender};
use upkeep_api::handlers::AppServices;
use upkeep_api::migrator::Migrator;
use upkeep_api::services::assets::NewAsset;
use upkeep_api::services::parts::NewPart;
use upkeep_api::AppState;

pub const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_purposes_only_32chars";

/// Helper harness backed by an in-memory SQLite database.
pub struct TestHarness {
    pub db: Arc<DbPool>,
    pub services: AppServices,
    pub auth: AuthService,
    event_sender: EventSender,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestHarness {
    /// Construct a fresh application state with a migrated schema.
    pub async fn new() -> Self {
        // In-memory SQLite only shares schema within a single connection.
        let mut opts = ConnectOptions::new("sqlite::memory:".to_string());
        opts.max_connections(1).min_connections(1);

        let db = Database::connect(opts)
            .await
            .expect("failed to open in-memory test database");
        Migrator::up(&db, None)
            .await
            .expect("failed to run migrations in tests");
        let db = Arc::new(db);

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let auth = AuthService::new(AuthConfig {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            jwt_issuer: "upkeep-api".to_string(),
            jwt_audience: "upkeep-auth".to_string(),
            token_expiration: Duration::from_secs(3600),
        });

        let services = AppServices::new(
            db.clone(),
            Arc::new(event_sender.clone()),
            auth.clone(),
        );

        Self {
            db,
            services,
            auth,
            event_sender,
            _event_task: event_task,
        }
    }

    /// A router serving the full v1 API against this harness's state.
    #[allow(dead_code)]
    pub fn router(&self) -> Router {
        let state = AppState {
            db: self.db.clone(),
            config: test_config(),
            event_sender: self.event_sender.clone(),
            auth: self.auth.clone(),
            services: self.services.clone(),
        };

        Router::new()
            .nest("/api/v1", upkeep_api::api_v1_routes())
            .with_state(state)
    }
}

/// Minimal configuration suitable for tests.
#[allow(dead_code)]
pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        jwt_expiration_secs: 3600,
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        log_level: "info".to_string(),
        log_json: false,
        auto_migrate: false,
        db_max_connections: 1,
        db_min_connections: 1,
        db_connect_timeout_secs: 30,
        db_idle_timeout_secs: 600,
        db_acquire_timeout_secs: 8,
        event_channel_capacity: 256,
        pm_horizon_days: 7,
        auth_issuer: "upkeep-api".to_string(),
        auth_audience: "upkeep-auth".to_string(),
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// A minimal asset input; override fields per test as needed.
#[allow(dead_code)]
pub fn asset_input(name: &str) -> NewAsset {
    NewAsset {
        name: name.to_string(),
        location: "Building A".to_string(),
        custom_attributes: Default::default(),
        next_pm_date: None,
        pm_frequency_days: None,
        assigned_to: None,
        image_filename: None,
    }
}

/// A minimal part input with zero minimum stock.
#[allow(dead_code)]
pub fn part_input(part_number: &str, unit_price: f64) -> NewPart {
    NewPart {
        part_number: part_number.to_string(),
        part_name: format!("Part {}", part_number),
        description: None,
        category: None,
        manufacturer: None,
        unit_price,
        minimum_stock: 0,
        location: None,
        supplier: None,
        supplier_contact: None,
        notes: None,
    }
}
