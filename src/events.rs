use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

// The events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Asset events
    AssetCreated(i32),
    AssetUpdated(i32),
    AssetDeleted(i32),
    MaintenanceRecorded {
        asset_id: i32,
        maintenance_id: i32,
        cost: Option<f64>,
    },
    PreventiveMaintenancePerformed {
        asset_id: i32,
        performed_on: DateTime<Utc>,
        next_due: Option<String>,
    },

    // Inventory events
    PartCreated(i32),
    PartUpdated(i32),
    PartDeleted(i32),
    StockChanged {
        part_id: i32,
        transaction_id: i32,
        old_stock: i32,
        new_stock: i32,
    },
    LowStock {
        part_id: i32,
        current_stock: i32,
        minimum_stock: i32,
    },

    // Maintenance point events
    MaintenancePointCreated(i32),
    MaintenancePointUpdated(i32),
    MaintenancePointDeactivated(i32),

    // User events
    UserRegistered(i32),
    UserLoggedIn(i32),
}

// Processes incoming events. Most handling is log-only today; side effects
// such as notifications hang off this loop when they are added.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::LowStock {
                part_id,
                current_stock,
                minimum_stock,
            } => {
                warn!(
                    part_id,
                    current_stock, minimum_stock, "Part stock at or below minimum"
                );
            }
            Event::StockChanged {
                part_id,
                transaction_id,
                old_stock,
                new_stock,
            } => {
                info!(
                    part_id,
                    transaction_id, old_stock, new_stock, "Part stock changed"
                );
            }
            other => {
                info!("Received event: {:?}", other);
            }
        }
    }

    info!("Event processing loop stopped");
}
