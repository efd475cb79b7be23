use crate::{
    db::DbPool,
    entities::{
        asset::Entity as Asset,
        maintenance_history::{self, Entity as MaintenanceHistory},
    },
    errors::ServiceError,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Substrings that mark a maintenance record as preventive work. The PM
/// workflow writes the second one into every synthesized description; the
/// first catches records entered by hand with the conventional tag.
/// Matching is plain case-sensitive substring containment.
const PM_MARKERS: [&str; 2] = ["(PM)", "บำรุงรักษาเชิงป้องกัน"];

/// Exact header of the maintenance history CSV export. Downstream
/// spreadsheets key on these bytes, spaces included.
const HISTORY_CSV_HEADER: &str = "Date, Description, Cost";

/// True iff the description marks a preventive-maintenance job.
pub fn is_pm_job(description: &str) -> bool {
    PM_MARKERS.iter().any(|marker| description.contains(marker))
}

/// One month's maintenance spend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCost {
    /// `YYYY-MM` label of the month.
    pub month: String,
    pub total_cost: f64,
}

/// Counts of maintenance jobs per classification bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTypeBreakdown {
    pub pm_jobs: u64,
    pub corrective_jobs: u64,
}

/// Read-only aggregates over maintenance history.
pub struct ReportService {
    db_pool: Arc<DbPool>,
}

impl ReportService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Maintenance spend per calendar month, ascending by month. Only rows
    /// with a positive cost qualify; months without any are omitted rather
    /// than zero-filled.
    pub async fn monthly_cost_totals(&self) -> Result<Vec<MonthlyCost>, ServiceError> {
        let rows = MaintenanceHistory::find()
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        let mut totals: BTreeMap<String, f64> = BTreeMap::new();
        for row in rows {
            match row.cost {
                Some(cost) if cost > 0.0 => {
                    let month = row.date.format("%Y-%m").to_string();
                    *totals.entry(month).or_insert(0.0) += cost;
                }
                _ => {}
            }
        }

        Ok(totals
            .into_iter()
            .map(|(month, total_cost)| MonthlyCost { month, total_cost })
            .collect())
    }

    /// Every history record lands in exactly one bucket: PM when its
    /// description carries a PM marker, corrective/general otherwise.
    pub async fn job_type_breakdown(&self) -> Result<JobTypeBreakdown, ServiceError> {
        let rows = MaintenanceHistory::find()
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        let mut breakdown = JobTypeBreakdown {
            pm_jobs: 0,
            corrective_jobs: 0,
        };
        for row in rows {
            if is_pm_job(&row.description) {
                breakdown.pm_jobs += 1;
            } else {
                breakdown.corrective_jobs += 1;
            }
        }

        Ok(breakdown)
    }

    /// The asset's maintenance history as CSV bytes, newest first.
    pub async fn export_history_csv(&self, asset_id: i32) -> Result<Vec<u8>, ServiceError> {
        let db = self.db_pool.as_ref();

        Asset::find_by_id(asset_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Asset with ID {} not found", asset_id))
            })?;

        let rows = MaintenanceHistory::find()
            .filter(maintenance_history::Column::AssetId.eq(asset_id))
            .order_by_desc(maintenance_history::Column::Date)
            .order_by_desc(maintenance_history::Column::Id)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let mut csv = String::new();
        csv.push_str(HISTORY_CSV_HEADER);
        csv.push('\n');
        for row in rows {
            let cost = row.cost.unwrap_or(0.0);
            csv.push_str(&format!(
                "{},{},{}\n",
                row.date.format("%Y-%m-%d %H:%M:%S"),
                escape_field(&row.description, ','),
                cost
            ));
        }

        Ok(csv.into_bytes())
    }
}

fn escape_field(value: &str, delimiter: char) -> String {
    if value.contains(delimiter) || value.contains('"') || value.contains('\n') {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pm_markers_classify_descriptions() {
        assert!(is_pm_job("ดำเนินการบำรุงรักษาเชิงป้องกัน (PM) ตามรอบ 30 วัน"));
        assert!(is_pm_job("Quarterly check (PM) on compressor"));
        assert!(is_pm_job("งานบำรุงรักษาเชิงป้องกันประจำปี"));
        assert!(!is_pm_job("Replaced broken fan belt"));
        // Case-sensitive on purpose
        assert!(!is_pm_job("quarterly check (pm)"));
    }

    #[test]
    fn csv_fields_with_delimiters_are_quoted() {
        assert_eq!(escape_field("plain", ','), "plain");
        assert_eq!(escape_field("a,b", ','), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\"", ','), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn csv_header_is_bit_exact() {
        assert_eq!(HISTORY_CSV_HEADER.as_bytes(), b"Date, Description, Cost");
    }
}
