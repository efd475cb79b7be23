use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveModelBehavior;
use serde::{Deserialize, Serialize};

/// Join row recording that a maintenance job consumed a part, with the unit
/// cost snapshotted at the time of use. Its existence blocks deletion of the
/// referenced part.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maintenance_parts_used")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub maintenance_history_id: i32,
    pub part_id: i32,
    pub quantity_used: i32,
    pub unit_cost: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::maintenance_history::Entity",
        from = "Column::MaintenanceHistoryId",
        to = "super::maintenance_history::Column::Id"
    )]
    MaintenanceHistory,
    #[sea_orm(
        belongs_to = "super::part::Entity",
        from = "Column::PartId",
        to = "super::part::Column::Id"
    )]
    Part,
}

impl Related<super::maintenance_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaintenanceHistory.def()
    }
}

impl Related<super::part::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Part.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {}
