mod common;

use std::collections::BTreeMap;

use assert_matches::assert_matches;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use common::{asset_input, TestHarness};
use upkeep_api::entities::{maintenance_history, maintenance_point, maintenance_point_image};
use upkeep_api::errors::ServiceError;
use upkeep_api::services::assets::{NewMaintenance, UpdateAsset};
use upkeep_api::services::maintenance_points::{NewMaintenancePoint, NewPointImage};

#[tokio::test]
async fn custom_attributes_round_trip_through_storage() {
    let app = TestHarness::new().await;

    let mut input = asset_input("CNC Mill");
    input.custom_attributes = BTreeMap::from([
        ("serial".to_string(), "X-1042".to_string()),
        ("voltage".to_string(), "400V".to_string()),
    ]);
    let asset = app
        .services
        .assets
        .create_asset(input)
        .await
        .expect("create asset");

    let reloaded = app
        .services
        .assets
        .get_asset(asset.id)
        .await
        .expect("reload asset");
    let attrs = reloaded.custom_attributes();
    assert_eq!(attrs.get("serial").map(String::as_str), Some("X-1042"));
    assert_eq!(attrs.get("voltage").map(String::as_str), Some("400V"));
}

#[tokio::test]
async fn malformed_due_dates_are_rejected_on_create_and_update() {
    let app = TestHarness::new().await;

    let mut input = asset_input("Bad Date");
    input.next_pm_date = Some("01/06/2024".to_string());
    let err = app
        .services
        .assets
        .create_asset(input)
        .await
        .expect_err("non-ISO date must be rejected");
    assert_matches!(err, ServiceError::ValidationError(_));

    let asset = app
        .services
        .assets
        .create_asset(asset_input("Good Asset"))
        .await
        .expect("create asset");
    let err = app
        .services
        .assets
        .update_asset(
            asset.id,
            UpdateAsset {
                next_pm_date: Some("not-a-date".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect_err("non-ISO date must be rejected");
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn empty_due_date_clears_the_schedule() {
    let app = TestHarness::new().await;

    let mut input = asset_input("Scheduled");
    input.next_pm_date = Some("2024-09-01".to_string());
    let asset = app
        .services
        .assets
        .create_asset(input)
        .await
        .expect("create asset");
    assert_eq!(asset.next_pm_date.as_deref(), Some("2024-09-01"));

    let updated = app
        .services
        .assets
        .update_asset(
            asset.id,
            UpdateAsset {
                next_pm_date: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .expect("clear schedule");
    assert_eq!(updated.next_pm_date, None);
}

#[tokio::test]
async fn zero_or_negative_pm_frequency_is_rejected() {
    let app = TestHarness::new().await;

    let mut input = asset_input("Zero Freq");
    input.pm_frequency_days = Some(0);
    let err = app
        .services
        .assets
        .create_asset(input)
        .await
        .expect_err("zero frequency must be rejected");
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn maintenance_on_unknown_asset_is_not_found() {
    let app = TestHarness::new().await;

    let err = app
        .services
        .assets
        .add_maintenance(
            999,
            NewMaintenance {
                description: "Ghost job".to_string(),
                cost: None,
            },
            None,
        )
        .await
        .expect_err("unknown asset");
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn history_lists_newest_entries_first() {
    let app = TestHarness::new().await;
    let asset = app
        .services
        .assets
        .create_asset(asset_input("Conveyor"))
        .await
        .expect("create asset");

    for description in ["first", "second", "third"] {
        app.services
            .assets
            .add_maintenance(
                asset.id,
                NewMaintenance {
                    description: description.to_string(),
                    cost: None,
                },
                None,
            )
            .await
            .expect("record maintenance");
    }

    let history = app
        .services
        .assets
        .asset_history(asset.id)
        .await
        .expect("asset history");
    let descriptions: Vec<&str> = history.iter().map(|h| h.description.as_str()).collect();
    assert_eq!(descriptions, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn deleting_an_asset_cascades_to_history_points_and_images() {
    let app = TestHarness::new().await;
    let asset = app
        .services
        .assets
        .create_asset(asset_input("Doomed"))
        .await
        .expect("create asset");

    app.services
        .assets
        .add_maintenance(
            asset.id,
            NewMaintenance {
                description: "Pre-delete job".to_string(),
                cost: Some(20.0),
            },
            None,
        )
        .await
        .expect("record maintenance");

    let point = app
        .services
        .maintenance_points
        .create_point(
            asset.id,
            NewMaintenancePoint {
                point_name: "Grease nipple".to_string(),
                description: None,
                maintenance_procedure: None,
                frequency_days: Some(14),
            },
            None,
        )
        .await
        .expect("create point");
    app.services
        .maintenance_points
        .add_image(
            point.id,
            NewPointImage {
                image_filename: "nipple.jpg".to_string(),
                image_description: None,
                image_type: None,
            },
            None,
        )
        .await
        .expect("attach image");

    app.services
        .assets
        .delete_asset(asset.id)
        .await
        .expect("delete asset");

    let history = maintenance_history::Entity::find()
        .filter(maintenance_history::Column::AssetId.eq(asset.id))
        .all(app.db.as_ref())
        .await
        .expect("query history");
    assert!(history.is_empty());

    let points = maintenance_point::Entity::find()
        .filter(maintenance_point::Column::AssetId.eq(asset.id))
        .all(app.db.as_ref())
        .await
        .expect("query points");
    assert!(points.is_empty());

    let images = maintenance_point_image::Entity::find()
        .filter(maintenance_point_image::Column::MaintenancePointId.eq(point.id))
        .all(app.db.as_ref())
        .await
        .expect("query images");
    assert!(images.is_empty());
}

#[tokio::test]
async fn search_matches_name_or_location() {
    let app = TestHarness::new().await;

    let mut input = asset_input("Rooftop AHU");
    input.location = "Roof".to_string();
    app.services
        .assets
        .create_asset(input)
        .await
        .expect("create asset");
    app.services
        .assets
        .create_asset(asset_input("Basement Pump"))
        .await
        .expect("create asset");

    let by_name = app
        .services
        .assets
        .list_assets(Some("AHU"))
        .await
        .expect("search by name");
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].name, "Rooftop AHU");

    let by_location = app
        .services
        .assets
        .list_assets(Some("Roof"))
        .await
        .expect("search by location");
    assert_eq!(by_location.len(), 1);
}
