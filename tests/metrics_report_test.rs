use axum::http::StatusCode;
use chrono::NaiveDate;
use ledgerscope::api::{self, AppState};
use ledgerscope::db::init_db;
use ledgerscope::{
    BrandId, DailyVendorRecord, Decimal, Operator, OperatorScope, Repository, Vendor, VendorId,
};
use std::str::FromStr;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

struct TestApp {
    app: axum::Router,
    repo: Arc<Repository>,
    _temp: TempDir,
}

async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");

    let repo = Arc::new(Repository::new(pool));
    let app = api::create_router(AppState::new(repo.clone()));

    let test_app = TestApp {
        app,
        repo,
        _temp: temp_dir,
    };

    test_app
        .repo
        .upsert_operator(&Operator {
            api_key: "admin-key".to_string(),
            name: "admin".to_string(),
            scope: OperatorScope::All,
        })
        .await
        .unwrap();
    test_app
        .repo
        .upsert_vendor(&Vendor {
            vendor_id: VendorId::new(1),
            name: "vendor-1".to_string(),
            brand_id: BrandId::new(10),
        })
        .await
        .unwrap();

    test_app
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::from_str(s).unwrap()
}

async fn request(app: axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let req = axum::http::Request::builder()
        .method("GET")
        .uri(uri)
        .header("x-api-key", "admin-key")
        .body(axum::body::Body::empty())
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn test_metrics_report_derives_the_full_row() {
    let test_app = setup_test_app().await;

    let mut record = DailyVendorRecord::empty(VendorId::new(1), day("2024-03-05"));
    record.deposit = dec("1000");
    record.withdraw = dec("200");
    record.ad_expense = dec("100");
    record.ads_chargeback = dec("10");
    record.ads_commission_rate = dec("10");
    record.registration_count = 40;
    record.ftd_count = 8;
    record.ads_views = 5000;
    record.ads_clicks = 250;
    record.top_up_amount = dec("60");
    test_app.repo.upsert_daily_record(&record).await.unwrap();

    let (status, body) = request(
        test_app.app,
        "/v1/reports/metrics?from=2024-03-01&to=2024-03-31",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];

    assert_eq!(row["vendorId"], 1);
    assert_eq!(row["date"], "2024-03-05");
    assert_eq!(row["revenue"], 800.0);
    assert_eq!(row["totalAdCost"], 120.0);
    let roi = row["roi"].as_f64().unwrap();
    assert!((roi - 666.6666667).abs() < 1e-4, "roi was {}", roi);
    assert_eq!(row["ltv"], 100.0);
    assert_eq!(row["conversionRate"], 20.0);
    assert_eq!(row["ftdCost"], 15.0);
    assert_eq!(row["adsViews"], 5000);
    assert_eq!(row["adsClicks"], 250);
    assert_eq!(row["registrationCount"], 40);
    assert_eq!(row["ftdCount"], 8);
    // balance opens at 0: 0 + 60 - 120 = -60
    assert_eq!(row["runningBalance"], -60.0);
    assert_eq!(row["topUpAmount"], 60.0);
}

#[tokio::test]
async fn test_zero_denominators_render_as_zero() {
    let test_app = setup_test_app().await;

    let mut record = DailyVendorRecord::empty(VendorId::new(1), day("2024-03-05"));
    record.deposit = dec("100");
    test_app.repo.upsert_daily_record(&record).await.unwrap();

    let (status, body) = request(
        test_app.app,
        "/v1/reports/metrics?from=2024-03-01&to=2024-03-31",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let row = &json.as_array().unwrap()[0];
    assert_eq!(row["conversionRate"], 0.0);
    assert_eq!(row["ltv"], 0.0);
    assert_eq!(row["ftdCost"], 0.0);
    assert_eq!(row["roi"], 0.0);
}

#[tokio::test]
async fn test_metrics_rows_cover_each_recorded_day() {
    let test_app = setup_test_app().await;

    for (d, top_up, expense) in [
        ("2024-03-01", "100", "10"),
        ("2024-03-02", "0", "20"),
        ("2024-03-07", "0", "5"),
    ] {
        let mut record = DailyVendorRecord::empty(VendorId::new(1), day(d));
        record.top_up_amount = dec(top_up);
        record.ad_expense = dec(expense);
        test_app.repo.upsert_daily_record(&record).await.unwrap();
    }

    let (status, body) = request(
        test_app.app,
        "/v1/reports/metrics?from=2024-03-01&to=2024-03-31",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 3);

    // Running balance carries across the gap: 90, 70, 65.
    assert_eq!(rows[0]["runningBalance"], 90.0);
    assert_eq!(rows[1]["runningBalance"], 70.0);
    assert_eq!(rows[2]["runningBalance"], 65.0);
}

#[tokio::test]
async fn test_unknown_vendor_filter_is_a_bad_request() {
    let test_app = setup_test_app().await;

    let (status, body) = request(
        test_app.app,
        "/v1/reports/metrics?vendor=99&from=2024-03-01&to=2024-03-31",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("vendor"));
}

#[tokio::test]
async fn test_non_numeric_filter_is_a_bad_request() {
    let test_app = setup_test_app().await;

    let (status, _) = request(
        test_app.app,
        "/v1/reports/metrics?brand=acme&from=2024-03-01&to=2024-03-31",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
