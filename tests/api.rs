use std::sync::Arc;
use std::time::Duration;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
use actix_web::web::Data;
use actix_web::{App, test};
use chrono::{Local, NaiveDate, NaiveTime};
use serde_json::{Value, json};

use timeclock::auth::jwt::accepted_for;
use timeclock::auth::password::hash_password;
use timeclock::config::Config;
use timeclock::export::pdf::ReportFonts;
use timeclock::model::attendance::AttendanceRecord;
use timeclock::models::UserSql;
use timeclock::routes;
use timeclock::store::{AttendanceStore, MemoryStore, UserStore};
use timeclock::utils::{used_tokens::UsedTokens, user_directory::UserDirectory};

const PEER: &str = "127.0.0.1:40000";

fn test_config() -> Config {
    Config {
        database_url: String::new(),
        jwt_secret: "integration-secret".to_string(),
        server_addr: "127.0.0.1:0".to_string(),
        clock_token_ttl: 300,
        rate_login_per_min: 600,
        rate_public_per_min: 6000,
        api_prefix: "/api".to_string(),
        log_dir: "logs".to_string(),
        user_cache_ttl: 60,
        pdf_font_path: None,
        pdf_bold_font_path: None,
    }
}

fn user(id: u64, username: &str, first: &str, last: &str, password: &str, active: bool) -> UserSql {
    UserSql {
        id,
        username: username.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        password: hash_password(password).unwrap(),
        is_active: active,
    }
}

fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_user(user(1, "jdoe", "John", "Doe", "pass-john", true))
        .unwrap();
    store
        .insert_user(user(2, "asmith", "Ann", "Smith", "pass-ann", true))
        .unwrap();
    store
        .insert_user(user(3, "gone", "Old", "Timer", "pass-old", false))
        .unwrap();
    store
}

fn build_app(
    store: Arc<MemoryStore>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let config = test_config();
    let attendance: Arc<dyn AttendanceStore> = store.clone();
    let users: Arc<dyn UserStore> = store;

    App::new()
        .app_data(Data::from(attendance))
        .app_data(Data::from(users.clone()))
        .app_data(Data::new(UserDirectory::new(users, Duration::from_secs(60))))
        .app_data(Data::new(UsedTokens::new(accepted_for(config.clock_token_ttl))))
        .app_data(Data::new(ReportFonts::bundled()))
        .app_data(Data::new(config.clone()))
        .configure(|cfg| routes::configure(cfg, config))
}

fn login(user_id: u64, password: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/auth/login")
        .peer_addr(PEER.parse().unwrap())
        .set_json(json!({ "user_id": user_id, "password": password }))
}

fn token_of(body: &Value) -> String {
    body["access_token"].as_str().unwrap().to_string()
}

// A fresh clock token for every punch, like selecting the user again.
macro_rules! token {
    ($app:expr, $user_id:expr, $password:expr) => {{
        let req = login($user_id, $password).to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        token_of(&body)
    }};
}

fn punch(action: &str, token: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri(&format!("/api/clock/{}", action))
        .peer_addr(PEER.parse().unwrap())
        .insert_header((AUTHORIZATION, format!("Bearer {}", token)))
}

fn get(uri: &str) -> test::TestRequest {
    test::TestRequest::get()
        .uri(uri)
        .peer_addr(PEER.parse().unwrap())
}

fn today(token: &str) -> test::TestRequest {
    get("/api/clock/today").insert_header((AUTHORIZATION, format!("Bearer {}", token)))
}

#[actix_web::test]
async fn user_list_shows_only_active_users_sorted_by_name() {
    let app = test::init_service(build_app(seeded_store())).await;

    let body: Value = test::call_and_read_body_json(&app, get("/users").to_request()).await;
    let names: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap().to_string())
        .collect();

    assert_eq!(names, vec!["jdoe", "asmith"]);
}

#[actix_web::test]
async fn login_checks_password_and_active_flag() {
    let app = test::init_service(build_app(seeded_store())).await;

    for (user_id, password, expected) in [
        (1, "pass-john", StatusCode::OK),
        (1, "wrong", StatusCode::UNAUTHORIZED),
        (3, "pass-old", StatusCode::UNAUTHORIZED),
        (42, "anything", StatusCode::UNAUTHORIZED),
        (1, "", StatusCode::BAD_REQUEST),
    ] {
        let resp = test::call_service(&app, login(user_id, password).to_request()).await;
        assert_eq!(resp.status(), expected, "user {user_id} / {password:?}");
    }
}

#[actix_web::test]
async fn clock_requires_a_token() {
    let app = test::init_service(build_app(seeded_store())).await;

    let resp = test::call_service(&app, punch("clock_in", "not-a-jwt").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/clock/clock_in")
        .peer_addr(PEER.parse().unwrap())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn full_day_of_punches() {
    let store = seeded_store();
    let app = test::init_service(build_app(store.clone())).await;

    let token = token!(app, 1, "pass-john");
    let req = punch("clock_in", &token).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["message"].as_str().unwrap().starts_with("John Doe clocked in"));
    assert_eq!(body["record"]["status"], "clocked_in");

    let token = token!(app, 1, "pass-john");
    let resp = test::call_service(&app, punch("clock_in", &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Already clocked in");
    assert_eq!(body["reason"], "already_clocked_in");

    let token = token!(app, 1, "pass-john");
    let resp = test::call_service(&app, punch("break_end", &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    for action in ["break_start", "break_end", "clock_out"] {
        let token = token!(app, 1, "pass-john");
        let resp = test::call_service(&app, punch(action, &token).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "{action}");
    }

    let today_date = Local::now().date_naive();
    let record = store.find(1, today_date).await.unwrap().unwrap();
    assert!(record.clock_out_time().is_some());
    assert!(record.total_work_time().is_some());

    let token = token!(app, 1, "pass-john");
    let body: Value = test::call_and_read_body_json(&app, today(&token).to_request()).await;
    assert_eq!(body["status"], "clocked_out");
}

#[actix_web::test]
async fn a_clock_token_is_good_for_one_punch() {
    let app = test::init_service(build_app(seeded_store())).await;
    let token = token!(app, 1, "pass-john");

    // reading today's status does not spend the token
    for _ in 0..2 {
        let resp = test::call_service(&app, today(&token).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = test::call_service(&app, punch("clock_in", &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    for action in ["break_start", "clock_out"] {
        let resp = test::call_service(&app, punch(action, &token).to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{action}");
    }
    let resp = test::call_service(&app, today(&token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let token = token!(app, 1, "pass-john");
    let resp = test::call_service(&app, punch("break_start", &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn a_rejected_punch_also_spends_the_token() {
    let app = test::init_service(build_app(seeded_store())).await;
    let token = token!(app, 2, "pass-ann");

    let resp = test::call_service(&app, punch("clock_out", &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(&app, punch("clock_in", &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn clearing_the_selection_revokes_the_token() {
    let app = test::init_service(build_app(seeded_store())).await;
    let token = token!(app, 1, "pass-john");

    let req = test::TestRequest::post()
        .uri("/auth/clear")
        .peer_addr(PEER.parse().unwrap())
        .insert_header((AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Selection cleared");

    let resp = test::call_service(&app, punch("clock_in", &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/auth/clear")
        .peer_addr(PEER.parse().unwrap())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn deactivated_user_is_locked_out_of_the_clock() {
    let store = seeded_store();
    let app = test::init_service(build_app(store.clone())).await;
    let token = token!(app, 1, "pass-john");
    let body: Value = test::call_and_read_body_json(&app, get("/users").to_request()).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    store
        .insert_user(user(1, "jdoe", "John", "Doe", "pass-john", false))
        .unwrap();

    let resp = test::call_service(&app, today(&token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = test::call_service(&app, punch("clock_in", &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // the cached selection list is refreshed
    let body: Value = test::call_and_read_body_json(&app, get("/users").to_request()).await;
    assert_eq!(body["data"][0]["username"], "asmith");
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn unknown_action_is_a_bad_request() {
    let app = test::init_service(build_app(seeded_store())).await;
    let token = token!(app, 2, "pass-ann");

    let resp = test::call_service(&app, punch("lunch", &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Unknown action: lunch");
}

#[actix_web::test]
async fn dashboard_reflects_todays_punches() {
    let store = seeded_store();
    let app = test::init_service(build_app(store.clone())).await;
    let token = token!(app, 2, "pass-ann");

    let resp = test::call_service(&app, punch("clock_in", &token).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = get("/api/dashboard").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total_clocked_in"], 1);
    assert_eq!(body["total_not_clocked_in"], 1);
    assert_eq!(body["total_on_break"], 0);

    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    let ann = rows
        .iter()
        .find(|r| r["user"]["username"] == "asmith")
        .unwrap();
    assert_eq!(ann["status"], "clocked_in");
    assert_eq!(ann["display_name"], "Ann Smith");
}

async fn seed_history(store: &MemoryStore) {
    let t = |h| NaiveTime::from_hms_opt(h, 0, 0);
    let day = |d| NaiveDate::from_ymd_opt(2026, 1, d).unwrap();
    for (user_id, d) in [(1, 5), (2, 5), (1, 6)] {
        let record = AttendanceRecord::restore(user_id, day(d), t(9), t(18), t(12), t(13));
        store.save(&record).await.unwrap();
    }
}

#[actix_web::test]
async fn reports_filter_and_ignore_bad_input() {
    let store = seeded_store();
    seed_history(&store).await;
    let app = test::init_service(build_app(store)).await;

    let body: Value = test::call_and_read_body_json(&app, get("/api/reports").to_request()).await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["data"][0]["record"]["date"], "2026-01-06");

    let req = get("/api/reports?start_date=2026-01-06").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 1);

    let body: Value = test::call_and_read_body_json(
        &app,
        get("/api/reports?start_date=yesterday&end_date=2026-13-01&user=2").to_request(),
    )
    .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["username"], "asmith");
    assert_eq!(body["data"][0]["record"]["total_work_seconds"], 8 * 3600);
}

#[actix_web::test]
async fn csv_export() {
    let store = seeded_store();
    seed_history(&store).await;
    let app = test::init_service(build_app(store)).await;

    let resp = test::call_service(&app, get("/api/reports/export/csv?user=1").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(CONTENT_TYPE).unwrap(),
        "text/csv; charset=utf-8"
    );
    assert!(
        resp.headers()
            .get("content-disposition")
            .unwrap()
            .to_str()
            .unwrap()
            .contains("attendance_report.csv")
    );

    let body = test::read_body(resp).await;
    let text = std::str::from_utf8(&body).unwrap();
    let lines: Vec<_> = text.split("\r\n").filter(|l| !l.is_empty()).collect();
    assert!(lines[0].starts_with('\u{feff}'));
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[1],
        "John Doe,jdoe,2026-01-06,09:00:00,18:00:00,12:00:00,13:00:00,08:00,01:00"
    );
}

#[actix_web::test]
async fn pdf_export() {
    let store = seeded_store();
    seed_history(&store).await;
    let app = test::init_service(build_app(store)).await;

    let resp = test::call_service(&app, get("/api/reports/export/pdf").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(CONTENT_TYPE).unwrap(), "application/pdf");

    let body = test::read_body(resp).await;
    assert!(body.starts_with(b"%PDF-"));
    assert!(body.windows(5).rev().take(16).any(|w| w == b"%%EOF"));
}
