use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, Set};
use serde::{Deserialize, Serialize};

/// Reference image attached to a maintenance point. Deleted together with
/// its owning point; the cascade is enforced in the service layer, not by
/// the storage engine.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maintenance_point_images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub maintenance_point_id: i32,
    pub image_filename: String,
    pub image_description: Option<String>,
    pub image_type: String,
    pub uploaded_by: Option<i32>,
    pub upload_date: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::maintenance_point::Entity",
        from = "Column::MaintenancePointId",
        to = "super::maintenance_point::Column::Id"
    )]
    MaintenancePoint,
}

impl Related<super::maintenance_point::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaintenancePoint.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        if let ActiveValue::NotSet = active_model.image_type {
            active_model.image_type = Set("reference".to_string());
        }
        if let ActiveValue::NotSet = active_model.upload_date {
            active_model.upload_date = Set(Utc::now());
        }
        Ok(active_model)
    }
}
