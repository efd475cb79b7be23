use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, Set};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A physical asset under maintenance. Root aggregate for the maintenance
/// domain: owns its history rows and maintenance points (and, transitively,
/// point images).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub location: String,
    /// JSON-serialized free-form key/value attribute map.
    #[sea_orm(column_type = "Text")]
    pub custom_data: String,
    /// ISO calendar date (YYYY-MM-DD) when present. Stored as text so that
    /// a blank value round-trips unchanged; the scheduler treats anything
    /// unparseable as "not scheduled".
    pub next_pm_date: Option<String>,
    pub pm_frequency_days: Option<i32>,
    /// Weak reference to the assigned technician.
    pub assigned_to: Option<i32>,
    pub image_filename: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Model {
    /// Deserializes the custom attribute map. An unreadable blob is treated
    /// as empty rather than failing the whole read.
    pub fn custom_attributes(&self) -> BTreeMap<String, String> {
        serde_json::from_str(&self.custom_data).unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::maintenance_history::Entity")]
    MaintenanceHistory,
    #[sea_orm(has_many = "super::maintenance_point::Entity")]
    MaintenancePoints,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AssignedTo",
        to = "super::user::Column::Id"
    )]
    AssignedTechnician,
}

impl Related<super::maintenance_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaintenanceHistory.def()
    }
}

impl Related<super::maintenance_point::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaintenancePoints.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssignedTechnician.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        if let ActiveValue::NotSet = active_model.created_at {
            active_model.created_at = Set(Utc::now());
        }
        Ok(active_model)
    }
}
