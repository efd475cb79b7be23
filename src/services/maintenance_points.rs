use crate::{
    db::DbPool,
    entities::{
        asset::Entity as Asset,
        maintenance_point::{self, Entity as MaintenancePoint, STATUS_ACTIVE},
        maintenance_point_image::{self, Entity as MaintenancePointImage},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct NewMaintenancePoint {
    #[validate(length(min = 1, message = "point_name must not be empty"))]
    pub point_name: String,
    pub description: Option<String>,
    pub maintenance_procedure: Option<String>,
    pub frequency_days: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct NewPointImage {
    #[validate(length(min = 1, message = "image_filename must not be empty"))]
    pub image_filename: String,
    pub image_description: Option<String>,
    pub image_type: Option<String>,
}

/// Inspection/maintenance points attached to assets, plus their reference
/// images. Images live and die with their owning point.
pub struct MaintenancePointService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl MaintenancePointService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    pub async fn create_point(
        &self,
        asset_id: i32,
        input: NewMaintenancePoint,
        actor: Option<i32>,
    ) -> Result<maintenance_point::Model, ServiceError> {
        input.validate()?;
        let db = self.db_pool.as_ref();

        Asset::find_by_id(asset_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Asset with ID {} not found", asset_id))
            })?;

        if let Some(days) = input.frequency_days {
            if days <= 0 {
                return Err(ServiceError::ValidationError(
                    "frequency_days must be positive".to_string(),
                ));
            }
        }

        let point = maintenance_point::ActiveModel {
            asset_id: Set(asset_id),
            point_name: Set(input.point_name),
            description: Set(input.description),
            maintenance_procedure: Set(input.maintenance_procedure),
            frequency_days: Set(input.frequency_days),
            status: Set(STATUS_ACTIVE.to_string()),
            created_by: Set(actor),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(
            point_id = point.id,
            asset_id, "Created maintenance point"
        );

        self.event_sender
            .send(Event::MaintenancePointCreated(point.id))
            .await
            .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))?;

        Ok(point)
    }

    pub async fn list_points(
        &self,
        asset_id: i32,
    ) -> Result<Vec<maintenance_point::Model>, ServiceError> {
        let db = self.db_pool.as_ref();

        Asset::find_by_id(asset_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Asset with ID {} not found", asset_id))
            })?;

        MaintenancePoint::find()
            .filter(maintenance_point::Column::AssetId.eq(asset_id))
            .order_by_asc(maintenance_point::Column::Id)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn get_point(
        &self,
        point_id: i32,
    ) -> Result<maintenance_point::Model, ServiceError> {
        MaintenancePoint::find_by_id(point_id)
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Maintenance point with ID {} not found",
                    point_id
                ))
            })
    }

    /// Deletes a point together with its images, in one transaction.
    #[instrument(skip(self))]
    pub async fn delete_point(&self, point_id: i32) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();

        self.get_point(point_id).await?;

        db.transaction::<_, (), ServiceError>(move |txn| {
            Box::pin(async move {
                MaintenancePointImage::delete_many()
                    .filter(maintenance_point_image::Column::MaintenancePointId.eq(point_id))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                MaintenancePoint::delete_by_id(point_id)
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

        info!(point_id, "Deleted maintenance point and its images");

        Ok(())
    }

    pub async fn add_image(
        &self,
        point_id: i32,
        input: NewPointImage,
        actor: Option<i32>,
    ) -> Result<maintenance_point_image::Model, ServiceError> {
        input.validate()?;
        self.get_point(point_id).await?;

        let image = maintenance_point_image::ActiveModel {
            maintenance_point_id: Set(point_id),
            image_filename: Set(input.image_filename),
            image_description: Set(input.image_description),
            image_type: Set(input.image_type.unwrap_or_else(|| "reference".to_string())),
            uploaded_by: Set(actor),
            ..Default::default()
        }
        .insert(self.db_pool.as_ref())
        .await
        .map_err(ServiceError::db_error)?;

        Ok(image)
    }

    pub async fn list_images(
        &self,
        point_id: i32,
    ) -> Result<Vec<maintenance_point_image::Model>, ServiceError> {
        self.get_point(point_id).await?;

        MaintenancePointImage::find()
            .filter(maintenance_point_image::Column::MaintenancePointId.eq(point_id))
            .order_by_asc(maintenance_point_image::Column::Id)
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn delete_image(&self, point_id: i32, image_id: i32) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();

        let image = MaintenancePointImage::find_by_id(image_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Image with ID {} not found", image_id))
            })?;

        if image.maintenance_point_id != point_id {
            return Err(ServiceError::NotFound(format!(
                "Image with ID {} not found on point {}",
                image_id, point_id
            )));
        }

        MaintenancePointImage::delete_by_id(image_id)
            .exec(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(())
    }
}
