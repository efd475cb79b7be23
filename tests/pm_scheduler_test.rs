mod common;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use common::{asset_input, TestHarness};
use upkeep_api::entities::maintenance_history;
use upkeep_api::errors::ServiceError;
use upkeep_api::services::users::RegisterUser;

fn date(s: &str) -> NaiveDate {
    s.parse().expect("valid test date")
}

#[tokio::test]
async fn performing_pm_advances_the_due_date_by_the_frequency() {
    let app = TestHarness::new().await;

    let mut input = asset_input("Chiller 1");
    input.next_pm_date = Some("2024-01-01".to_string());
    input.pm_frequency_days = Some(30);
    let asset = app
        .services
        .assets
        .create_asset(input)
        .await
        .expect("create asset");

    let outcome = app
        .services
        .scheduler
        .perform_pm(asset.id, date("2024-01-01"), None)
        .await
        .expect("perform PM");

    assert_eq!(outcome.asset.next_pm_date.as_deref(), Some("2024-01-31"));
    // PM jobs are recorded at zero cost with the standard PM description.
    assert_eq!(outcome.history.cost, Some(0.0));
    assert!(outcome.history.description.contains("(PM)"));
    assert!(outcome.history.description.contains("30"));
}

#[tokio::test]
async fn pm_due_date_advances_from_the_given_date_not_the_old_schedule() {
    let app = TestHarness::new().await;

    let mut input = asset_input("Chiller 2");
    input.next_pm_date = Some("2024-01-01".to_string());
    input.pm_frequency_days = Some(7);
    let asset = app
        .services
        .assets
        .create_asset(input)
        .await
        .expect("create asset");

    // PM performed two weeks late still schedules from the performed date.
    let outcome = app
        .services
        .scheduler
        .perform_pm(asset.id, date("2024-01-15"), None)
        .await
        .expect("perform PM late");
    assert_eq!(outcome.asset.next_pm_date.as_deref(), Some("2024-01-22"));
}

#[tokio::test]
async fn pm_without_a_frequency_fails_and_leaves_no_history() {
    let app = TestHarness::new().await;

    let asset = app
        .services
        .assets
        .create_asset(asset_input("Ad-hoc Fan"))
        .await
        .expect("create asset");

    let err = app
        .services
        .scheduler
        .perform_pm(asset.id, date("2024-06-01"), None)
        .await
        .expect_err("no frequency configured");
    assert_matches!(err, ServiceError::InvalidState(_));

    let rows = maintenance_history::Entity::find()
        .filter(maintenance_history::Column::AssetId.eq(asset.id))
        .all(app.db.as_ref())
        .await
        .expect("query history");
    assert!(rows.is_empty(), "failed PM must not write history");
}

#[tokio::test]
async fn pm_on_unknown_asset_is_not_found() {
    let app = TestHarness::new().await;

    let err = app
        .services
        .scheduler
        .perform_pm(4242, date("2024-06-01"), None)
        .await
        .expect_err("unknown asset");
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn due_listing_covers_the_horizon_and_sorts_ascending() {
    let app = TestHarness::new().await;

    for (name, due) in [
        ("Due Later", "2024-03-08"),
        ("Due Soon", "2024-03-02"),
        ("Far Future", "2024-04-01"),
        ("Already Overdue", "2024-02-20"),
    ] {
        let mut input = asset_input(name);
        input.next_pm_date = Some(due.to_string());
        input.pm_frequency_days = Some(30);
        app.services
            .assets
            .create_asset(input)
            .await
            .expect("create asset");
    }
    // No schedule at all: never listed.
    app.services
        .assets
        .create_asset(asset_input("Unscheduled"))
        .await
        .expect("create asset");

    let due = app
        .services
        .scheduler
        .list_due_within(date("2024-03-01"), 7, None)
        .await
        .expect("due listing");

    let names: Vec<&str> = due.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Due Soon", "Due Later"]);
}

#[tokio::test]
async fn overdue_listing_includes_today_and_earlier() {
    let app = TestHarness::new().await;

    for (name, due) in [("Overdue", "2024-02-20"), ("Today", "2024-03-01"), ("Future", "2024-03-05")] {
        let mut input = asset_input(name);
        input.next_pm_date = Some(due.to_string());
        app.services
            .assets
            .create_asset(input)
            .await
            .expect("create asset");
    }

    let overdue = app
        .services
        .scheduler
        .list_overdue(date("2024-03-01"), None)
        .await
        .expect("overdue listing");
    let names: Vec<&str> = overdue.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Overdue", "Today"]);
}

#[tokio::test]
async fn technician_filter_limits_due_listing_to_assignments() {
    let app = TestHarness::new().await;

    let tech = app
        .services
        .users
        .register(RegisterUser {
            username: "somchai".to_string(),
            password: "correct-horse-battery".to_string(),
            role: None,
        })
        .await
        .expect("register technician");

    let mut mine = asset_input("Mine");
    mine.next_pm_date = Some("2024-03-02".to_string());
    mine.assigned_to = Some(tech.id);
    app.services
        .assets
        .create_asset(mine)
        .await
        .expect("create assigned asset");

    let mut other = asset_input("Someone Else's");
    other.next_pm_date = Some("2024-03-02".to_string());
    app.services
        .assets
        .create_asset(other)
        .await
        .expect("create unassigned asset");

    let due = app
        .services
        .scheduler
        .list_due_within(date("2024-03-01"), 7, Some(tech.id))
        .await
        .expect("filtered listing");
    let names: Vec<&str> = due.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Mine"]);
}

#[tokio::test]
async fn event_feed_links_each_scheduled_asset() {
    let app = TestHarness::new().await;

    let mut input = asset_input("Boiler");
    input.next_pm_date = Some("2024-05-20".to_string());
    let asset = app
        .services
        .assets
        .create_asset(input)
        .await
        .expect("create asset");
    app.services
        .assets
        .create_asset(asset_input("No Schedule"))
        .await
        .expect("create unscheduled asset");

    let events = app
        .services
        .scheduler
        .schedule_event_feed()
        .await
        .expect("event feed");

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "Boiler");
    assert_eq!(events[0].start, "2024-05-20");
    assert_eq!(events[0].url, format!("/api/v1/assets/{}", asset.id));
    assert_eq!(events[0].color, "#28a745");
}
