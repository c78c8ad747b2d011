mod common;

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use common::{ScriptedHrms, day, engine_for, roster};
use hrm_attendance::config::Config;
use hrm_attendance::model::AttendanceStatus;
use hrm_attendance::provider::StoreError;
use hrm_attendance::routes;
use hrm_attendance::sync::AttendanceSyncEngine;
use serde_json::{Value, json};

fn config() -> Config {
    Config::from_lookup(|key| match key {
        "SERVER_ADDR" => Some("127.0.0.1:0".to_string()),
        "HRMS_API_URL" => Some("http://hrms.invalid".to_string()),
        _ => None,
    })
    .unwrap()
}

fn peer() -> SocketAddr {
    "10.0.0.7:40000".parse().unwrap()
}

macro_rules! console {
    ($engine:expr) => {{
        let config = config();
        test::init_service(
            App::new()
                .app_data(web::Data::from($engine.clone()))
                .configure(|cfg| routes::configure(cfg, &config)),
        )
        .await
    }};
}

async fn loaded_engine(hrms: &Arc<ScriptedHrms>) -> Arc<AttendanceSyncEngine> {
    let engine = engine_for(hrms);
    engine.load_day(day(10)).await.unwrap();
    engine
}

#[actix_web::test]
async fn day_view_lists_rows_with_states() {
    let hrms = ScriptedHrms::new(roster());
    hrms.seed(1, day(10), AttendanceStatus::Present).await;
    let engine = loaded_engine(&hrms).await;
    let app = console!(engine);

    let req = test::TestRequest::get()
        .uri("/api/attendance")
        .peer_addr(peer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["selected_date"], "2024-01-10");
    assert_eq!(body["loading"], false);
    assert_eq!(body["summary"], json!({ "present": 1, "absent": 0, "pending": 1 }));
    assert_eq!(body["rows"][0]["state"], "marked");
    assert_eq!(body["rows"][0]["status"], "Present");
    assert_eq!(body["rows"][0]["actionable"], false);
    assert_eq!(body["rows"][1]["state"], "pending");
    assert_eq!(body["rows"][1]["status"], Value::Null);
    assert_eq!(body["rows"][1]["actionable"], true);
}

#[actix_web::test]
async fn mark_then_remark_returns_created_then_conflict() {
    let hrms = ScriptedHrms::new(roster());
    let engine = loaded_engine(&hrms).await;
    let app = console!(engine);

    let req = test::TestRequest::post()
        .uri("/api/attendance")
        .peer_addr(peer())
        .set_json(json!({ "employee_id": 2, "status": "Absent" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let record: Value = test::read_body_json(resp).await;
    assert_eq!(record["employee_id"], 2);
    assert_eq!(record["date"], "2024-01-10");

    let req = test::TestRequest::post()
        .uri("/api/attendance")
        .peer_addr(peer())
        .set_json(json!({ "employee_id": 2, "status": "Present" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Attendance already marked for this date");
    assert_eq!(hrms.creates(), 1);
}

#[actix_web::test]
async fn unreachable_store_is_a_bad_gateway_and_rolls_back() {
    let hrms = ScriptedHrms::new(roster());
    let engine = loaded_engine(&hrms).await;
    hrms.fail_next_create(StoreError::Transport("connection refused".into()));
    let app = console!(engine);

    let req = test::TestRequest::post()
        .uri("/api/attendance")
        .peer_addr(peer())
        .set_json(json!({ "employee_id": 1, "status": "Present" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Could not reach the server, please try again");

    let req = test::TestRequest::get()
        .uri("/api/attendance")
        .peer_addr(peer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["rows"][0]["state"], "pending");
}

#[actix_web::test]
async fn unknown_employee_is_unprocessable() {
    let hrms = ScriptedHrms::new(roster());
    let engine = loaded_engine(&hrms).await;
    let app = console!(engine);

    let req = test::TestRequest::post()
        .uri("/api/attendance")
        .peer_addr(peer())
        .set_json(json!({ "employee_id": 77, "status": "Present" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(hrms.creates(), 0);
}

#[actix_web::test]
async fn unrecognized_status_is_refused_before_the_engine() {
    let hrms = ScriptedHrms::new(roster());
    let engine = loaded_engine(&hrms).await;
    let app = console!(engine);

    let req = test::TestRequest::post()
        .uri("/api/attendance")
        .peer_addr(peer())
        .set_json(json!({ "employee_id": 1, "status": "Late" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(hrms.creates(), 0);
}

#[actix_web::test]
async fn selecting_a_date_reloads_the_view() {
    let hrms = ScriptedHrms::new(roster());
    hrms.seed(2, day(11), AttendanceStatus::Absent).await;
    let engine = loaded_engine(&hrms).await;
    let app = console!(engine);

    let req = test::TestRequest::put()
        .uri("/api/attendance/date")
        .set_json(json!({ "date": "2024-01-11" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;

    assert_eq!(body["selected_date"], "2024-01-11");
    assert_eq!(body["superseded"], false);
    assert_eq!(body["rows"][0]["state"], "pending");
    assert_eq!(body["rows"][1]["status"], "Absent");
    assert_eq!(engine.selected_date(), day(11));
}

#[actix_web::test]
async fn failed_reload_reports_unknown_rows() {
    let hrms = ScriptedHrms::new(roster());
    let engine = loaded_engine(&hrms).await;
    hrms.fail_next_day(StoreError::Transport("timeout".into()));
    let app = console!(engine);

    let req = test::TestRequest::put()
        .uri("/api/attendance/date")
        .set_json(json!({ "date": "2024-01-12" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: Value = test::read_body_json(resp).await;

    assert_eq!(body["loading"], false);
    assert_eq!(body["summary"], Value::Null);
    assert!(body["error"].is_string());
    assert_eq!(body["rows"][0]["state"], "unknown");
    assert_eq!(body["rows"][1]["actionable"], false);

    let req = test::TestRequest::post()
        .uri("/api/attendance")
        .peer_addr(peer())
        .set_json(json!({ "employee_id": 1, "status": "Present" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}
