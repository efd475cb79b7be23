use crate::{
    db::DbPool,
    entities::{
        maintenance_history,
        maintenance_parts_used::{self, Entity as MaintenancePartsUsed},
        part::{self, Entity as Part},
        parts_transaction::{self, Entity as PartsTransaction, TransactionType},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

/// Spare-parts inventory with its append-only stock ledger.
///
/// Every stock change appends a `parts_transactions` row and updates the
/// owning part's denormalized `current_stock` in the same database
/// transaction; the balance therefore always equals the fold of the
/// part's ledger.
pub struct PartService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct NewPart {
    #[validate(length(min = 1, message = "part_number must not be empty"))]
    pub part_number: String,
    #[validate(length(min = 1, message = "part_name must not be empty"))]
    pub part_name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub minimum_stock: i32,
    pub location: Option<String>,
    pub supplier: Option<String>,
    pub supplier_contact: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdatePart {
    pub part_number: Option<String>,
    pub part_name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub unit_price: Option<f64>,
    pub minimum_stock: Option<i32>,
    pub location: Option<String>,
    pub supplier: Option<String>,
    pub supplier_contact: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct NewTransaction {
    pub transaction_type: TransactionType,
    /// Delta for `in`/`out`; the target absolute stock level for
    /// `adjustment`.
    pub quantity: i32,
    pub reference_type: Option<String>,
    pub reference_id: Option<i32>,
    pub unit_cost: Option<f64>,
    pub notes: Option<String>,
}

/// What a ledger append did to the part's balance.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionOutcome {
    pub transaction: parts_transaction::Model,
    pub old_stock: i32,
    pub new_stock: i32,
}

impl PartService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    pub async fn create_part(
        &self,
        input: NewPart,
        actor: Option<i32>,
    ) -> Result<part::Model, ServiceError> {
        input.validate()?;
        let db = self.db_pool.as_ref();

        let existing = Part::find()
            .filter(part::Column::PartNumber.eq(input.part_number.clone()))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Part number {} already exists",
                input.part_number
            )));
        }

        let part = part::ActiveModel {
            part_number: Set(input.part_number),
            part_name: Set(input.part_name),
            description: Set(input.description),
            category: Set(input.category),
            manufacturer: Set(input.manufacturer),
            unit_price: Set(input.unit_price),
            minimum_stock: Set(input.minimum_stock),
            current_stock: Set(0),
            location: Set(input.location),
            supplier: Set(input.supplier),
            supplier_contact: Set(input.supplier_contact),
            notes: Set(input.notes),
            created_by: Set(actor),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(part_id = part.id, part_number = %part.part_number, "Created part");

        self.event_sender
            .send(Event::PartCreated(part.id))
            .await
            .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))?;

        Ok(part)
    }

    pub async fn update_part(
        &self,
        part_id: i32,
        input: UpdatePart,
    ) -> Result<part::Model, ServiceError> {
        input.validate()?;
        let db = self.db_pool.as_ref();

        let part = self.get_part(part_id).await?;

        if let Some(new_number) = &input.part_number {
            if new_number != &part.part_number {
                let taken = Part::find()
                    .filter(part::Column::PartNumber.eq(new_number.clone()))
                    .one(db)
                    .await
                    .map_err(ServiceError::db_error)?;
                if taken.is_some() {
                    return Err(ServiceError::Conflict(format!(
                        "Part number {} already exists",
                        new_number
                    )));
                }
            }
        }

        let mut active: part::ActiveModel = part.into();
        if let Some(v) = input.part_number {
            active.part_number = Set(v);
        }
        if let Some(v) = input.part_name {
            active.part_name = Set(v);
        }
        if let Some(v) = input.description {
            active.description = Set(Some(v));
        }
        if let Some(v) = input.category {
            active.category = Set(Some(v));
        }
        if let Some(v) = input.manufacturer {
            active.manufacturer = Set(Some(v));
        }
        if let Some(v) = input.unit_price {
            active.unit_price = Set(v);
        }
        if let Some(v) = input.minimum_stock {
            active.minimum_stock = Set(v);
        }
        if let Some(v) = input.location {
            active.location = Set(Some(v));
        }
        if let Some(v) = input.supplier {
            active.supplier = Set(Some(v));
        }
        if let Some(v) = input.supplier_contact {
            active.supplier_contact = Set(Some(v));
        }
        if let Some(v) = input.notes {
            active.notes = Set(Some(v));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::PartUpdated(updated.id))
            .await
            .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))?;

        Ok(updated)
    }

    pub async fn get_part(&self, part_id: i32) -> Result<part::Model, ServiceError> {
        Part::find_by_id(part_id)
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Part with ID {} not found", part_id)))
    }

    /// Lists parts, newest first. `search` matches part number or name.
    pub async fn list_parts(&self, search: Option<&str>) -> Result<Vec<part::Model>, ServiceError> {
        let mut query = Part::find().order_by_desc(part::Column::Id);

        if let Some(term) = search.map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(part::Column::PartNumber.contains(term))
                    .add(part::Column::PartName.contains(term)),
            );
        }

        query
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    /// Parts at or below their minimum stock level, for the restock view.
    pub async fn list_low_stock(&self) -> Result<Vec<part::Model>, ServiceError> {
        Part::find()
            .filter(
                Expr::col(part::Column::CurrentStock)
                    .lte(Expr::col(part::Column::MinimumStock)),
            )
            .order_by_asc(part::Column::CurrentStock)
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    /// Appends one ledger row and moves the part's balance, atomically.
    ///
    /// `out` may drive the balance negative; callers wanting stricter
    /// semantics must enforce them before calling.
    #[instrument(skip(self, input))]
    pub async fn record_transaction(
        &self,
        part_id: i32,
        input: NewTransaction,
        actor: Option<i32>,
    ) -> Result<TransactionOutcome, ServiceError> {
        if input.quantity < 0 {
            return Err(ServiceError::ValidationError(
                "Transaction quantity must not be negative".to_string(),
            ));
        }

        let db = self.db_pool.as_ref();
        let outcome = db
            .transaction::<_, TransactionOutcome, ServiceError>(move |txn| {
                Box::pin(async move {
                    let part = Part::find_by_id(part_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Part with ID {} not found", part_id))
                        })?;

                    let old_stock = part.current_stock;
                    let new_stock = input
                        .transaction_type
                        .resolved_stock(old_stock, input.quantity);

                    let transaction = parts_transaction::ActiveModel {
                        part_id: Set(part_id),
                        transaction_type: Set(input.transaction_type.as_str().to_string()),
                        quantity: Set(input.quantity),
                        reference_type: Set(input.reference_type),
                        reference_id: Set(input.reference_id),
                        unit_cost: Set(input.unit_cost),
                        notes: Set(input.notes),
                        created_by: Set(actor),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    let mut active: part::ActiveModel = part.into();
                    active.current_stock = Set(new_stock);
                    active.updated_at = Set(Utc::now());
                    active.update(txn).await.map_err(ServiceError::db_error)?;

                    Ok(TransactionOutcome {
                        transaction,
                        old_stock,
                        new_stock,
                    })
                })
            })
            .await
            .map_err(|e| match e {
                sea_orm::TransactionError::Connection(e) => ServiceError::DatabaseError(e),
                sea_orm::TransactionError::Transaction(e) => e,
            })?;

        info!(
            part_id,
            transaction_id = outcome.transaction.id,
            old_stock = outcome.old_stock,
            new_stock = outcome.new_stock,
            "Recorded parts transaction"
        );

        self.event_sender
            .send(Event::StockChanged {
                part_id,
                transaction_id: outcome.transaction.id,
                old_stock: outcome.old_stock,
                new_stock: outcome.new_stock,
            })
            .await
            .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))?;

        let part = self.get_part(part_id).await?;
        if part.is_low_stock() {
            self.event_sender
                .send(Event::LowStock {
                    part_id,
                    current_stock: part.current_stock,
                    minimum_stock: part.minimum_stock,
                })
                .await
                .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))?;
        }

        Ok(outcome)
    }

    /// Records that a maintenance job consumed a part: one usage row with a
    /// unit-price snapshot plus the matching `out` ledger entry, atomically.
    #[instrument(skip(self))]
    pub async fn use_part_for_maintenance(
        &self,
        maintenance_history_id: i32,
        part_id: i32,
        quantity: i32,
        notes: Option<String>,
        actor: Option<i32>,
    ) -> Result<TransactionOutcome, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::ValidationError(
                "Quantity used must be positive".to_string(),
            ));
        }

        let db = self.db_pool.as_ref();
        let outcome = db
            .transaction::<_, TransactionOutcome, ServiceError>(move |txn| {
                Box::pin(async move {
                    let history = maintenance_history::Entity::find_by_id(maintenance_history_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Maintenance record with ID {} not found",
                                maintenance_history_id
                            ))
                        })?;

                    let part = Part::find_by_id(part_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Part with ID {} not found", part_id))
                        })?;

                    maintenance_parts_used::ActiveModel {
                        maintenance_history_id: Set(history.id),
                        part_id: Set(part_id),
                        quantity_used: Set(quantity),
                        unit_cost: Set(Some(part.unit_price)),
                        notes: Set(notes),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    let old_stock = part.current_stock;
                    let new_stock = TransactionType::Out.resolved_stock(old_stock, quantity);

                    let transaction = parts_transaction::ActiveModel {
                        part_id: Set(part_id),
                        transaction_type: Set(TransactionType::Out.as_str().to_string()),
                        quantity: Set(quantity),
                        reference_type: Set(Some("maintenance".to_string())),
                        reference_id: Set(Some(history.id)),
                        unit_cost: Set(Some(part.unit_price)),
                        notes: Set(None),
                        created_by: Set(actor),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    let mut active: part::ActiveModel = part.into();
                    active.current_stock = Set(new_stock);
                    active.updated_at = Set(Utc::now());
                    active.update(txn).await.map_err(ServiceError::db_error)?;

                    Ok(TransactionOutcome {
                        transaction,
                        old_stock,
                        new_stock,
                    })
                })
            })
            .await
            .map_err(|e| match e {
                sea_orm::TransactionError::Connection(e) => ServiceError::DatabaseError(e),
                sea_orm::TransactionError::Transaction(e) => e,
            })?;

        self.event_sender
            .send(Event::StockChanged {
                part_id,
                transaction_id: outcome.transaction.id,
                old_stock: outcome.old_stock,
                new_stock: outcome.new_stock,
            })
            .await
            .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))?;

        Ok(outcome)
    }

    /// The part's ledger, newest first.
    pub async fn transaction_history(
        &self,
        part_id: i32,
    ) -> Result<Vec<parts_transaction::Model>, ServiceError> {
        // 404 for unknown parts rather than an empty ledger
        let part = self.get_part(part_id).await?;

        part.find_related(PartsTransaction)
            .order_by_desc(parts_transaction::Column::TransactionDate)
            .order_by_desc(parts_transaction::Column::Id)
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    /// Deletes a part and its entire ledger. Refused while any maintenance
    /// job still references the part.
    #[instrument(skip(self))]
    pub async fn delete_part(&self, part_id: i32) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();

        let part = self.get_part(part_id).await?;

        let usage_count = MaintenancePartsUsed::find()
            .filter(maintenance_parts_used::Column::PartId.eq(part_id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        if usage_count > 0 {
            return Err(ServiceError::Conflict(format!(
                "Part {} is referenced by {} maintenance record(s) and cannot be deleted",
                part.part_number, usage_count
            )));
        }

        db.transaction::<_, (), ServiceError>(move |txn| {
            Box::pin(async move {
                PartsTransaction::delete_many()
                    .filter(parts_transaction::Column::PartId.eq(part_id))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                Part::delete_by_id(part_id)
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

        info!(part_id, "Deleted part and its transaction ledger");

        self.event_sender
            .send(Event::PartDeleted(part_id))
            .await
            .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))?;

        Ok(())
    }
}
