mod common;

use assert_matches::assert_matches;
use chrono::NaiveDateTime;
use sea_orm::{ActiveModelTrait, Set};

use common::{asset_input, TestHarness};
use upkeep_api::entities::maintenance_history;
use upkeep_api::errors::ServiceError;

async fn seed_history(
    app: &TestHarness,
    asset_id: i32,
    description: &str,
    cost: Option<f64>,
    when: &str,
) -> maintenance_history::Model {
    let date = NaiveDateTime::parse_from_str(&format!("{} 12:00:00", when), "%Y-%m-%d %H:%M:%S")
        .expect("valid seed date")
        .and_utc();

    maintenance_history::ActiveModel {
        asset_id: Set(asset_id),
        description: Set(description.to_string()),
        cost: Set(cost),
        date: Set(date),
        ..Default::default()
    }
    .insert(app.db.as_ref())
    .await
    .expect("seed history row")
}

#[tokio::test]
async fn monthly_totals_group_by_month_ascending_and_skip_costless_months() {
    let app = TestHarness::new().await;
    let asset = app
        .services
        .assets
        .create_asset(asset_input("Generator"))
        .await
        .expect("create asset");

    seed_history(&app, asset.id, "Oil change", Some(120.0), "2024-02-10").await;
    seed_history(&app, asset.id, "Belt swap", Some(80.0), "2024-02-25").await;
    seed_history(&app, asset.id, "Inspection", Some(45.5), "2024-01-05").await;
    // Zero and missing costs never produce a month entry.
    seed_history(&app, asset.id, "Visual check", Some(0.0), "2024-03-01").await;
    seed_history(&app, asset.id, "Note only", None, "2024-04-01").await;

    let totals = app
        .services
        .reports
        .monthly_cost_totals()
        .await
        .expect("monthly totals");

    let months: Vec<&str> = totals.iter().map(|t| t.month.as_str()).collect();
    assert_eq!(months, vec!["2024-01", "2024-02"]);
    assert!((totals[0].total_cost - 45.5).abs() < 1e-9);
    assert!((totals[1].total_cost - 200.0).abs() < 1e-9);
}

#[tokio::test]
async fn job_breakdown_separates_pm_from_corrective_work() {
    let app = TestHarness::new().await;
    let asset = app
        .services
        .assets
        .create_asset(asset_input("Elevator"))
        .await
        .expect("create asset");

    seed_history(
        &app,
        asset.id,
        "ดำเนินการบำรุงรักษาเชิงป้องกัน (PM) ตามรอบ 30 วัน",
        Some(0.0),
        "2024-01-10",
    )
    .await;
    seed_history(&app, asset.id, "ตรวจเช็คบำรุงรักษาเชิงป้องกัน", None, "2024-01-20").await;
    seed_history(&app, asset.id, "Replaced broken door sensor", Some(300.0), "2024-02-01").await;

    let breakdown = app
        .services
        .reports
        .job_type_breakdown()
        .await
        .expect("job breakdown");

    assert_eq!(breakdown.pm_jobs, 2);
    assert_eq!(breakdown.corrective_jobs, 1);
}

#[tokio::test]
async fn csv_export_uses_the_fixed_header_and_newest_first_order() {
    let app = TestHarness::new().await;
    let asset = app
        .services
        .assets
        .create_asset(asset_input("Cooling Tower"))
        .await
        .expect("create asset");

    seed_history(&app, asset.id, "First job", Some(10.0), "2024-01-01").await;
    seed_history(&app, asset.id, "Second job", None, "2024-02-01").await;

    let csv = app
        .services
        .reports
        .export_history_csv(asset.id)
        .await
        .expect("csv export");
    let text = String::from_utf8(csv).expect("utf-8 csv");
    let lines: Vec<&str> = text.lines().collect();

    // The header is a fixed byte sequence consumers key on.
    assert_eq!(lines[0], "Date, Description, Cost");
    assert!(lines[1].contains("Second job"));
    assert!(lines[1].ends_with(",0"));
    assert!(lines[2].contains("First job"));
    assert!(lines[2].ends_with(",10"));
}

#[tokio::test]
async fn csv_descriptions_with_delimiters_are_quoted() {
    let app = TestHarness::new().await;
    let asset = app
        .services
        .assets
        .create_asset(asset_input("Press"))
        .await
        .expect("create asset");

    seed_history(
        &app,
        asset.id,
        "Replaced belt, tensioner and \"guard\"",
        Some(55.0),
        "2024-03-03",
    )
    .await;

    let csv = app
        .services
        .reports
        .export_history_csv(asset.id)
        .await
        .expect("csv export");
    let text = String::from_utf8(csv).expect("utf-8 csv");

    assert!(text.contains("\"Replaced belt, tensioner and \"\"guard\"\"\""));
}

#[tokio::test]
async fn csv_export_for_unknown_asset_is_not_found() {
    let app = TestHarness::new().await;

    let err = app
        .services
        .reports
        .export_history_csv(777)
        .await
        .expect_err("unknown asset");
    assert_matches!(err, ServiceError::NotFound(_));
}
