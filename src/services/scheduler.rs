use crate::{
    db::DbPool,
    entities::{
        asset::{self, Entity as Asset},
        maintenance_history,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// Calendar color used for preventive-maintenance events.
const PM_EVENT_COLOR: &str = "#28a745";

/// Parses an asset's stored due date. Stored as free text; anything that is
/// not a clean ISO calendar date counts as "no schedule".
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

/// True iff the asset has a parseable due date on or before `as_of`.
/// Absent, empty, or malformed dates are never due.
pub fn is_due(asset: &asset::Model, as_of: NaiveDate) -> bool {
    asset
        .next_pm_date
        .as_deref()
        .and_then(parse_due_date)
        .map(|due| due <= as_of)
        .unwrap_or(false)
}

/// The synthesized description for a performed PM job. The reporting
/// aggregator recognizes PM jobs by substring, so this text is part of the
/// data contract.
pub fn pm_description(frequency_days: i32) -> String {
    format!(
        "ดำเนินการบำรุงรักษาเชิงป้องกัน (PM) ตามรอบ {} วัน",
        frequency_days
    )
}

/// One entry of the maintenance calendar feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEvent {
    pub title: String,
    pub start: String,
    pub url: String,
    pub color: String,
}

/// Result of performing preventive maintenance on an asset.
#[derive(Debug, Clone, Serialize)]
pub struct PerformPmOutcome {
    pub asset: asset::Model,
    pub history: maintenance_history::Model,
}

/// Preventive-maintenance scheduling: due-date queries, the calendar feed,
/// and the one automatic path that advances `next_pm_date`.
pub struct SchedulerService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl SchedulerService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Assets whose due date falls within `[as_of, as_of + horizon_days]`,
    /// ascending by date. `technician` narrows to that user's assignments.
    pub async fn list_due_within(
        &self,
        as_of: NaiveDate,
        horizon_days: i64,
        technician: Option<i32>,
    ) -> Result<Vec<asset::Model>, ServiceError> {
        let mut query = Asset::find().filter(asset::Column::NextPmDate.is_not_null());
        if let Some(user_id) = technician {
            query = query.filter(asset::Column::AssignedTo.eq(user_id));
        }

        let assets = query
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        let end = as_of + Duration::days(horizon_days);
        let mut due: Vec<(NaiveDate, asset::Model)> = assets
            .into_iter()
            .filter_map(|a| {
                let date = a.next_pm_date.as_deref().and_then(parse_due_date)?;
                (date >= as_of && date <= end).then_some((date, a))
            })
            .collect();
        due.sort_by_key(|(date, _)| *date);

        Ok(due.into_iter().map(|(_, a)| a).collect())
    }

    /// Overdue or due-today assets, ascending by date.
    pub async fn list_overdue(
        &self,
        as_of: NaiveDate,
        technician: Option<i32>,
    ) -> Result<Vec<asset::Model>, ServiceError> {
        let mut query = Asset::find().filter(asset::Column::NextPmDate.is_not_null());
        if let Some(user_id) = technician {
            query = query.filter(asset::Column::AssignedTo.eq(user_id));
        }

        let assets = query
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        let mut due: Vec<(NaiveDate, asset::Model)> = assets
            .into_iter()
            .filter_map(|a| {
                let date = a.next_pm_date.as_deref().and_then(parse_due_date)?;
                (date <= as_of).then_some((date, a))
            })
            .collect();
        due.sort_by_key(|(date, _)| *date);

        Ok(due.into_iter().map(|(_, a)| a).collect())
    }

    /// Records a performed PM job and advances the asset's due date by its
    /// configured frequency, in one transaction.
    #[instrument(skip(self))]
    pub async fn perform_pm(
        &self,
        asset_id: i32,
        as_of: NaiveDate,
        actor: Option<i32>,
    ) -> Result<PerformPmOutcome, ServiceError> {
        let db = self.db_pool.as_ref();
        let outcome = db
            .transaction::<_, PerformPmOutcome, ServiceError>(move |txn| {
                Box::pin(async move {
                    let asset = Asset::find_by_id(asset_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Asset with ID {} not found", asset_id))
                        })?;

                    let frequency = asset.pm_frequency_days.ok_or_else(|| {
                        ServiceError::InvalidState(format!(
                            "Asset {} has no PM frequency configured",
                            asset_id
                        ))
                    })?;

                    let next_due = as_of + Duration::days(frequency as i64);

                    let history = maintenance_history::ActiveModel {
                        asset_id: Set(asset_id),
                        description: Set(pm_description(frequency)),
                        cost: Set(Some(0.0)),
                        date: Set(Utc::now()),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    let mut active: asset::ActiveModel = asset.into();
                    active.next_pm_date = Set(Some(next_due.format("%Y-%m-%d").to_string()));
                    let asset = active.update(txn).await.map_err(ServiceError::db_error)?;

                    Ok(PerformPmOutcome { asset, history })
                })
            })
            .await
            .map_err(|e| match e {
                sea_orm::TransactionError::Connection(e) => ServiceError::DatabaseError(e),
                sea_orm::TransactionError::Transaction(e) => e,
            })?;

        info!(
            asset_id,
            next_due = outcome.asset.next_pm_date.as_deref().unwrap_or(""),
            "Performed preventive maintenance"
        );

        self.event_sender
            .send(Event::PreventiveMaintenancePerformed {
                asset_id,
                performed_on: outcome.history.date,
                next_due: outcome.asset.next_pm_date.clone(),
            })
            .await
            .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))?;

        Ok(outcome)
    }

    /// The calendar feed: one event per asset with a non-empty due date.
    /// Read-only; malformed dates are passed through as stored so the
    /// calendar shows what the asset record actually says.
    pub async fn schedule_event_feed(&self) -> Result<Vec<ScheduleEvent>, ServiceError> {
        let assets = Asset::find()
            .filter(asset::Column::NextPmDate.is_not_null())
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        Ok(assets
            .into_iter()
            .filter_map(|a| {
                let start = a.next_pm_date.as_deref()?.trim().to_string();
                if start.is_empty() {
                    return None;
                }
                Some(ScheduleEvent {
                    title: a.name,
                    start,
                    url: format!("/api/v1/assets/{}", a.id),
                    color: PM_EVENT_COLOR.to_string(),
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn asset_with_due_date(next_pm_date: Option<&str>) -> asset::Model {
        asset::Model {
            id: 1,
            name: "Chiller".into(),
            location: "Roof".into(),
            custom_data: serde_json::to_string(&BTreeMap::<String, String>::new()).unwrap(),
            next_pm_date: next_pm_date.map(str::to_string),
            pm_frequency_days: Some(30),
            assigned_to: None,
            image_filename: None,
            created_at: Utc::now(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn due_on_or_before_as_of_date() {
        let asset = asset_with_due_date(Some("2026-03-01"));
        assert!(is_due(&asset, date("2026-03-01")));
        assert!(is_due(&asset, date("2026-04-15")));
        assert!(!is_due(&asset, date("2026-02-28")));
    }

    #[test]
    fn missing_or_malformed_dates_are_never_due() {
        let far_future = date("2099-01-01");
        assert!(!is_due(&asset_with_due_date(None), far_future));
        assert!(!is_due(&asset_with_due_date(Some("")), far_future));
        assert!(!is_due(&asset_with_due_date(Some("  ")), far_future));
        assert!(!is_due(&asset_with_due_date(Some("next tuesday")), far_future));
        assert!(!is_due(&asset_with_due_date(Some("2026-13-40")), far_future));
    }

    #[test]
    fn due_date_parsing_trims_whitespace() {
        assert_eq!(parse_due_date(" 2026-03-01 "), Some(date("2026-03-01")));
    }

    #[test]
    fn pm_description_names_the_frequency() {
        let text = pm_description(30);
        assert!(text.contains("(PM)"));
        assert!(text.contains("30"));
    }
}
