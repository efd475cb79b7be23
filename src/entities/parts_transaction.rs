use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, Set};
use serde::{Deserialize, Serialize};

/// Kinds of stock-affecting ledger entries.
///
/// The quantity on a transaction means different things per type: a delta
/// for `In`/`Out`, but the *target absolute stock level* for `Adjustment`.
/// That asymmetry is part of the wire contract and is confined to
/// [`TransactionType::resolved_stock`]; everything else works with the
/// resolved balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    In,
    Out,
    Adjustment,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::In => "in",
            TransactionType::Out => "out",
            TransactionType::Adjustment => "adjustment",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "in" => Some(TransactionType::In),
            "out" => Some(TransactionType::Out),
            "adjustment" => Some(TransactionType::Adjustment),
            _ => None,
        }
    }

    /// The single place where a transaction's quantity is interpreted.
    /// Returns the stock level after applying this transaction.
    ///
    /// `Out` is allowed to drive the balance negative; the original system
    /// behaves this way and callers wanting stricter semantics must enforce
    /// them above the ledger.
    pub fn resolved_stock(&self, current_stock: i32, quantity: i32) -> i32 {
        match self {
            TransactionType::In => current_stock + quantity,
            TransactionType::Out => current_stock - quantity,
            TransactionType::Adjustment => quantity,
        }
    }
}

/// One row of the append-only inventory ledger. Never edited or deleted
/// individually; rows are only removed wholesale when their part is deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "parts_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub part_id: i32,
    pub transaction_type: String,
    pub quantity: i32,
    /// Optional pointer to the originating record, e.g. ("maintenance", 17).
    pub reference_type: Option<String>,
    pub reference_id: Option<i32>,
    pub unit_cost: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub transaction_date: DateTime<Utc>,
    pub created_by: Option<i32>,
}

impl Model {
    pub fn transaction_type(&self) -> Option<TransactionType> {
        TransactionType::from_str(&self.transaction_type)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::part::Entity",
        from = "Column::PartId",
        to = "super::part::Column::Id"
    )]
    Part,
}

impl Related<super::part::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Part.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        if let ActiveValue::NotSet = active_model.transaction_date {
            active_model.transaction_date = Set(Utc::now());
        }
        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_and_out_are_deltas() {
        assert_eq!(TransactionType::In.resolved_stock(10, 5), 15);
        assert_eq!(TransactionType::Out.resolved_stock(10, 4), 6);
    }

    #[test]
    fn adjustment_is_an_absolute_level_not_a_delta() {
        assert_eq!(TransactionType::Adjustment.resolved_stock(10, 3), 3);
        assert_eq!(TransactionType::Adjustment.resolved_stock(0, 120), 120);
    }

    #[test]
    fn out_may_go_negative() {
        assert_eq!(TransactionType::Out.resolved_stock(2, 5), -3);
    }

    #[test]
    fn type_string_round_trip() {
        for ty in [
            TransactionType::In,
            TransactionType::Out,
            TransactionType::Adjustment,
        ] {
            assert_eq!(TransactionType::from_str(ty.as_str()), Some(ty));
        }
        assert_eq!(TransactionType::from_str("transfer"), None);
    }
}
