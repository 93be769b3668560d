//! Dashboard and export flows against a mocked reporting backend.

use std::sync::Arc;

use chrono::NaiveDate;
use outlet_dashboard::export::{self, ExportOptions, ReportKind, report_filename};
use outlet_dashboard::{
    AccessError, AppContext, DashboardService, DsStatus, FilterState, KpiConfig, OutletSelection,
    Route,
};
use outlet_dashboard_client::http_client::ReqwestDashboardClient;
use outlet_dashboard_client::session::{Session, SessionStore};
use outlet_dashboard_client::{DashboardClient, Role, User};
use secrecy::SecretString;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn signed_in(role: Role) -> Arc<SessionStore> {
    let session = Arc::new(SessionStore::in_memory());
    session
        .set(Session {
            token: SecretString::new("tok".into()),
            user: User {
                id: "1".into(),
                name: "Rina".into(),
                email: "rina@example.com".into(),
                role,
                created_at: None,
            },
        })
        .await
        .expect("session");
    session
}

fn march_rows() -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "data": [
            {"outlet_id": 1, "nama_outlet": "Mall A", "lob": "cinema", "tanggal": "2024-03-01",
             "omzet_fnb": "2000000.00", "omzet_cinema": "5000000", "total_audience": 100,
             "target_head": "60000", "target_percentage": "100"},
            {"outlet_id": 2, "nama_outlet": "Mall B", "lob": "cinema",
             "tanggal": "2024-03-01T00:00:00.000000Z", "omzet_fnb": 500000, "omzet_cinema": null, "total_audience": "50",
             "target_head": 60000, "target_percentage": null},
            {"outlet_id": 1, "nama_outlet": "Mall A", "lob": "cinema", "tanggal": "2024-03-15",
             "omzet_fnb": 1000000, "omzet_cinema": 2500000, "total_audience": 0,
             "target_head": 60000}
        ]
    })
}

#[tokio::test]
async fn dashboard_loads_and_exports_a_month() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reports"))
        .and(query_param("month", "3"))
        .and(query_param("year", "2024"))
        .respond_with(ResponseTemplate::new(200).set_body_json(march_rows()))
        .mount(&server)
        .await;

    let session = signed_in(Role::User).await;
    let client: Arc<dyn DashboardClient> =
        Arc::new(ReqwestDashboardClient::new(&server.uri(), session.clone()));
    let filter = FilterState::new(3, 2024).expect("filter");
    let ctx = AppContext::new(session, filter.clone(), KpiConfig::default());
    ctx.guard(Route::OutletPerformance).await.expect("allowed");

    let mut dashboard = DashboardService::new(client, ctx.kpi().clone(), filter.clone());
    dashboard.apply_filter(filter).await.expect("apply");
    let state = dashboard.state();

    assert!(!state.loading);
    assert_eq!(state.daily.len(), 31);
    assert_eq!(state.daily[0].fnb, 2_500_000.0);
    assert_eq!(state.daily[0].outlet_count, 2);
    assert!(state.daily[14].has_data);
    assert!(!state.daily[1].has_data);
    assert_eq!(state.outlets.len(), 2);
    assert_eq!(state.summary.total_sales, 11_000_000.0);
    assert_eq!(
        state.summary.above_count + state.summary.near_count + state.summary.below_count,
        2
    );
    assert!(state.outlets.iter().all(|o| DsStatus::ALL.contains(&o.status)));

    let today = NaiveDate::from_ymd_opt(2024, 4, 2).expect("date");
    let bytes = export::outlet_report(
        &state.outlets,
        &state.summary,
        &state.filter.period_label(),
        today,
        dashboard.kpi(),
        &ExportOptions::default(),
    )
    .expect("pdf");
    assert!(bytes.starts_with(b"%PDF"));
    let doc = lopdf::Document::load_mem(&bytes).expect("parse pdf");
    assert_eq!(doc.get_pages().len(), 1);

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(report_filename(
        ReportKind::OutletPerformance,
        &state.filter.period_key(),
        today,
    ));
    export::save_report(&path, &bytes).await.expect("save");
    assert!(path.ends_with("outlet-performance_2024-03_20240402.pdf"));
    assert_eq!(std::fs::read(&path).expect("read"), bytes);
}

#[tokio::test]
async fn outlet_filter_is_sent_to_the_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reports"))
        .and(query_param("outlet_id", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let session = signed_in(Role::Admin).await;
    let client = Arc::new(ReqwestDashboardClient::new(&server.uri(), session));
    let filter = FilterState::new(3, 2024)
        .expect("filter")
        .with_outlet(OutletSelection::parse("2"));
    let mut dashboard = DashboardService::new(client, KpiConfig::default(), filter.clone());
    dashboard.apply_filter(filter).await.expect("apply");

    let state = dashboard.state();
    assert_eq!(state.daily.len(), 31);
    assert!(state.outlets.is_empty());
    assert_eq!(state.summary.best_outlet, None);
}

#[tokio::test]
async fn expired_token_redirects_to_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reports"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "message": "Unauthenticated."
        })))
        .mount(&server)
        .await;

    let session = signed_in(Role::Admin).await;
    let client = Arc::new(ReqwestDashboardClient::new(&server.uri(), session.clone()));
    let filter = FilterState::new(3, 2024).expect("filter");
    let ctx = AppContext::new(session, filter.clone(), KpiConfig::default());
    let mut dashboard = DashboardService::new(client, KpiConfig::default(), filter.clone());

    assert!(dashboard.apply_filter(filter).await.is_err());
    assert!(!dashboard.state().loading);
    assert_eq!(
        dashboard.state().error.as_deref(),
        Some("Your session has expired. Please log in again.")
    );
    assert_eq!(
        ctx.guard(Route::Dashboard).await,
        Err(AccessError::LoginRequired)
    );
}

#[tokio::test]
async fn unreachable_backend_is_reported_inline() {
    let session = signed_in(Role::Admin).await;
    // Port 9 (discard) on localhost is expected to refuse connections.
    let client = Arc::new(ReqwestDashboardClient::new("http://127.0.0.1:9", session));
    let filter = FilterState::new(3, 2024).expect("filter");
    let mut dashboard = DashboardService::new(client, KpiConfig::default(), filter.clone());

    assert!(dashboard.apply_filter(filter).await.is_err());
    let state = dashboard.state();
    assert!(!state.loading);
    assert_eq!(
        state.error.as_deref(),
        Some("Could not reach the server. Check your connection and try again.")
    );
}
