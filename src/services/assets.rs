use crate::{
    db::DbPool,
    entities::{
        asset::{self, Entity as Asset},
        maintenance_history::{self, Entity as MaintenanceHistory},
        maintenance_parts_used::{self, Entity as MaintenancePartsUsed},
        maintenance_point::{self, Entity as MaintenancePoint},
        maintenance_point_image::{self, Entity as MaintenancePointImage},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::scheduler::parse_due_date,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct NewAsset {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "location must not be empty"))]
    pub location: String,
    #[serde(default)]
    pub custom_attributes: BTreeMap<String, String>,
    pub next_pm_date: Option<String>,
    pub pm_frequency_days: Option<i32>,
    pub assigned_to: Option<i32>,
    pub image_filename: Option<String>,
}

/// Partial update. `next_pm_date: Some("")` clears the schedule.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateAsset {
    pub name: Option<String>,
    pub location: Option<String>,
    pub custom_attributes: Option<BTreeMap<String, String>>,
    pub next_pm_date: Option<String>,
    pub pm_frequency_days: Option<i32>,
    pub assigned_to: Option<i32>,
    pub image_filename: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct NewMaintenance {
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: String,
    pub cost: Option<f64>,
}

/// Physical assets and their append-only maintenance history.
pub struct AssetService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl AssetService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Lists assets, newest first. `search` matches name or location.
    pub async fn list_assets(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<asset::Model>, ServiceError> {
        let mut query = Asset::find().order_by_desc(asset::Column::Id);

        if let Some(term) = search.map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(asset::Column::Name.contains(term))
                    .add(asset::Column::Location.contains(term)),
            );
        }

        query
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn get_asset(&self, asset_id: i32) -> Result<asset::Model, ServiceError> {
        Asset::find_by_id(asset_id)
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Asset with ID {} not found", asset_id)))
    }

    pub async fn create_asset(&self, input: NewAsset) -> Result<asset::Model, ServiceError> {
        input.validate()?;
        let next_pm_date = normalize_due_date(input.next_pm_date.as_deref())?;
        validate_frequency(input.pm_frequency_days)?;

        let custom_data = serde_json::to_string(&input.custom_attributes)
            .map_err(|e| ServiceError::InternalError(format!("Failed to encode attributes: {}", e)))?;

        let asset = asset::ActiveModel {
            name: Set(input.name),
            location: Set(input.location),
            custom_data: Set(custom_data),
            next_pm_date: Set(next_pm_date),
            pm_frequency_days: Set(input.pm_frequency_days),
            assigned_to: Set(input.assigned_to),
            image_filename: Set(input.image_filename),
            ..Default::default()
        }
        .insert(self.db_pool.as_ref())
        .await
        .map_err(ServiceError::db_error)?;

        info!(asset_id = asset.id, name = %asset.name, "Created asset");

        self.event_sender
            .send(Event::AssetCreated(asset.id))
            .await
            .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))?;

        Ok(asset)
    }

    pub async fn update_asset(
        &self,
        asset_id: i32,
        input: UpdateAsset,
    ) -> Result<asset::Model, ServiceError> {
        validate_frequency(input.pm_frequency_days)?;
        let asset = self.get_asset(asset_id).await?;

        let mut active: asset::ActiveModel = asset.into();
        if let Some(v) = input.name {
            active.name = Set(v);
        }
        if let Some(v) = input.location {
            active.location = Set(v);
        }
        if let Some(attrs) = input.custom_attributes {
            let custom_data = serde_json::to_string(&attrs).map_err(|e| {
                ServiceError::InternalError(format!("Failed to encode attributes: {}", e))
            })?;
            active.custom_data = Set(custom_data);
        }
        if let Some(raw) = input.next_pm_date.as_deref() {
            active.next_pm_date = Set(normalize_due_date(Some(raw))?);
        }
        if let Some(v) = input.pm_frequency_days {
            active.pm_frequency_days = Set(Some(v));
        }
        if let Some(v) = input.assigned_to {
            active.assigned_to = Set(Some(v));
        }
        if let Some(v) = input.image_filename {
            active.image_filename = Set(Some(v));
        }

        let updated = active
            .update(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::AssetUpdated(updated.id))
            .await
            .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))?;

        Ok(updated)
    }

    /// Deletes an asset together with its maintenance history, part-usage
    /// rows, maintenance points, and point images. The storage engine
    /// enforces no cascade; every child table is cleared here explicitly,
    /// in one transaction.
    #[instrument(skip(self))]
    pub async fn delete_asset(&self, asset_id: i32) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();

        // 404 before touching anything
        self.get_asset(asset_id).await?;

        db.transaction::<_, (), ServiceError>(move |txn| {
            Box::pin(async move {
                let history_ids: Vec<i32> = MaintenanceHistory::find()
                    .select_only()
                    .column(maintenance_history::Column::Id)
                    .filter(maintenance_history::Column::AssetId.eq(asset_id))
                    .into_tuple()
                    .all(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                if !history_ids.is_empty() {
                    MaintenancePartsUsed::delete_many()
                        .filter(
                            maintenance_parts_used::Column::MaintenanceHistoryId
                                .is_in(history_ids.clone()),
                        )
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                }

                MaintenanceHistory::delete_many()
                    .filter(maintenance_history::Column::AssetId.eq(asset_id))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                let point_ids: Vec<i32> = MaintenancePoint::find()
                    .select_only()
                    .column(maintenance_point::Column::Id)
                    .filter(maintenance_point::Column::AssetId.eq(asset_id))
                    .into_tuple()
                    .all(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                if !point_ids.is_empty() {
                    MaintenancePointImage::delete_many()
                        .filter(
                            maintenance_point_image::Column::MaintenancePointId
                                .is_in(point_ids.clone()),
                        )
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    MaintenancePoint::delete_many()
                        .filter(maintenance_point::Column::AssetId.eq(asset_id))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                }

                Asset::delete_by_id(asset_id)
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                Ok(())
            })
        })
        .await
        .map_err(|e| match e {
            sea_orm::TransactionError::Connection(e) => ServiceError::DatabaseError(e),
            sea_orm::TransactionError::Transaction(e) => e,
        })?;

        info!(asset_id, "Deleted asset and its dependent records");

        self.event_sender
            .send(Event::AssetDeleted(asset_id))
            .await
            .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))?;

        Ok(())
    }

    /// Appends an ad-hoc (corrective) maintenance record.
    pub async fn add_maintenance(
        &self,
        asset_id: i32,
        input: NewMaintenance,
        _actor: Option<i32>,
    ) -> Result<maintenance_history::Model, ServiceError> {
        input.validate()?;
        self.get_asset(asset_id).await?;

        let history = maintenance_history::ActiveModel {
            asset_id: Set(asset_id),
            description: Set(input.description),
            cost: Set(input.cost),
            ..Default::default()
        }
        .insert(self.db_pool.as_ref())
        .await
        .map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::MaintenanceRecorded {
                asset_id,
                maintenance_id: history.id,
                cost: history.cost,
            })
            .await
            .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))?;

        Ok(history)
    }

    /// The asset's maintenance history, newest first.
    pub async fn asset_history(
        &self,
        asset_id: i32,
    ) -> Result<Vec<maintenance_history::Model>, ServiceError> {
        self.get_asset(asset_id).await?;

        MaintenanceHistory::find()
            .filter(maintenance_history::Column::AssetId.eq(asset_id))
            .order_by_desc(maintenance_history::Column::Date)
            .order_by_desc(maintenance_history::Column::Id)
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }
}

/// Empty input clears the schedule; anything else must be a clean ISO date.
fn normalize_due_date(raw: Option<&str>) -> Result<Option<String>, ServiceError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => match parse_due_date(value) {
            Some(date) => Ok(Some(date.format("%Y-%m-%d").to_string())),
            None => Err(ServiceError::ValidationError(format!(
                "next_pm_date must be an ISO calendar date, got {:?}",
                value
            ))),
        },
    }
}

fn validate_frequency(frequency: Option<i32>) -> Result<(), ServiceError> {
    match frequency {
        Some(days) if days <= 0 => Err(ServiceError::ValidationError(
            "pm_frequency_days must be positive".to_string(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_date_normalization() {
        assert_eq!(normalize_due_date(None).unwrap(), None);
        assert_eq!(normalize_due_date(Some("")).unwrap(), None);
        assert_eq!(normalize_due_date(Some("  ")).unwrap(), None);
        assert_eq!(
            normalize_due_date(Some("2026-03-01")).unwrap(),
            Some("2026-03-01".to_string())
        );
        assert!(normalize_due_date(Some("March 1st")).is_err());
    }

    #[test]
    fn frequency_must_be_positive() {
        assert!(validate_frequency(None).is_ok());
        assert!(validate_frequency(Some(30)).is_ok());
        assert!(validate_frequency(Some(0)).is_err());
        assert!(validate_frequency(Some(-7)).is_err());
    }
}
