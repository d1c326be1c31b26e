use std::time::Duration;

use axum::{
    http::{header, Request, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson},
    options::ClientOptions,
    Client,
};
use artista::{
    config,
    controllers::tax_controller,
    error::{ensure_deleted, ApiError},
    models::{CurrentUser, Role},
    routes,
    services::{self, calendar::Period, tax_service},
    AppState,
};
use tower::ServiceExt;

async fn test_state() -> AppState {
    let mut settings = config::load();
    settings.exchange_rate_url = "http://127.0.0.1:9/v6/latest/USD".to_string();
    settings.exchange_rate_fallback = None;

    let client = Client::with_uri_str(&settings.mongodb_uri)
        .await
        .expect("mongodb client");
    let db = client.database(&settings.mongodb_db);

    let rates = services::exchange_rate::ExchangeRateClient::from_settings(&settings);

    AppState { db, settings, rates }
}

/// State backed by a reachable MongoDB, or `None` when there is none.
async fn live_state() -> Option<AppState> {
    let settings = config::load();

    let mut opts = ClientOptions::parse(&settings.mongodb_uri).await.ok()?;
    opts.server_selection_timeout = Some(Duration::from_secs(2));
    let db = Client::with_options(opts).ok()?.database(&settings.mongodb_db);

    if db.run_command(doc! { "ping": 1 }, None).await.is_err() {
        eprintln!("mongodb not reachable, skipping");
        return None;
    }

    let rates = services::exchange_rate::ExchangeRateClient::from_settings(&settings);
    Some(AppState { db, settings, rates })
}

async fn response_json(res: axum::response::Response) -> serde_json::Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

fn user(role: Role) -> CurrentUser {
    CurrentUser {
        id: ObjectId::new(),
        name: "Test".to_string(),
        email: "test@example.com".to_string(),
        role,
    }
}

fn json_post(uri: &str, body: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn create_tax_without_percentage_returns_400() {
    let state = test_state().await;
    let app = Router::new()
        .route("/api/tax", post(tax_controller::create_tax))
        .with_state(state);

    let res = app.oneshot(json_post("/api/tax", r#"{"date":"2025-03-01"}"#)).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_json(res).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Percentage and date are required");
}

#[tokio::test]
async fn create_tax_without_date_returns_400() {
    let state = test_state().await;
    let app = Router::new()
        .route("/api/tax", post(tax_controller::create_tax))
        .with_state(state);

    let res = app.oneshot(json_post("/api/tax", r#"{"percentage":10}"#)).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_tax_rejects_out_of_range_percentage() {
    let state = test_state().await;
    let app = Router::new()
        .route("/api/tax", post(tax_controller::create_tax))
        .with_state(state);

    let res = app
        .oneshot(json_post("/api/tax", r#"{"percentage":"250","date":"2025-03-01"}"#))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_json(res).await;
    assert!(body["message"].as_str().unwrap().contains("at most 100"));
}

#[tokio::test]
async fn create_tax_rejects_bad_date() {
    let state = test_state().await;
    let app = Router::new()
        .route("/api/tax", post(tax_controller::create_tax))
        .with_state(state);

    let res = app
        .oneshot(json_post("/api/tax", r#"{"percentage":5,"date":"March 2025"}"#))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_tax_malformed_json_uses_error_envelope() {
    let state = test_state().await;
    let app = Router::new()
        .route("/api/tax", post(tax_controller::create_tax))
        .with_state(state);

    let res = app.oneshot(json_post("/api/tax", "{not json")).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_json(res).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn delete_tax_with_malformed_id_returns_404() {
    let state = test_state().await;
    let app = Router::new()
        .route("/api/tax/delete/:id", delete(tax_controller::delete_tax))
        .with_state(state);

    let req = Request::builder()
        .method("DELETE")
        .uri("/api/tax/delete/not-an-id")
        .body(axum::body::Body::empty())
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body = response_json(res).await;
    assert_eq!(body["message"], "Tax record not found");
}

#[tokio::test]
async fn tax_routes_require_a_token() {
    let state = test_state().await;
    let app = routes::app(state);

    let req = Request::builder()
        .uri("/api/tax/analytics/summary")
        .body(axum::body::Body::empty())
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = response_json(res).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn tax_routes_reject_employees() {
    let state = test_state().await;
    let app = routes::app(state);

    let mut req = Request::builder()
        .uri("/api/tax/analytics/summary")
        .body(axum::body::Body::empty())
        .unwrap();
    req.extensions_mut().insert(user(Role::Employee));

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_reaches_tax_validation() {
    let state = test_state().await;
    let app = routes::app(state);

    let mut req = json_post("/api/tax", r#"{"percentage":0,"date":"2025-01-01"}"#);
    req.extensions_mut().insert(user(Role::Admin));

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

fn march_2025() -> Period {
    Period::of(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
}

#[test]
fn tax_for_a_new_period_is_created() {
    let upserted = Bson::ObjectId(ObjectId::new());
    assert!(tax_service::creation_outcome(Some(&upserted), &march_2025()).is_ok());
}

#[tokio::test]
async fn tax_for_a_taken_period_is_a_conflict() {
    let err = tax_service::creation_outcome(None, &march_2025()).unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));

    let res = err.into_response();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let body = response_json(res).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Tax for March 2025 already exists.");
}

#[tokio::test]
async fn delete_that_matched_nothing_is_404() {
    fn missing() -> ApiError {
        ApiError::not_found("Tax record not found")
    }

    assert!(ensure_deleted(1, missing).is_ok());

    let res = ensure_deleted(0, missing).unwrap_err().into_response();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body = response_json(res).await;
    assert_eq!(body["message"], "Tax record not found");
}

#[tokio::test]
async fn unknown_tax_id_returns_404() {
    let Some(state) = live_state().await else {
        return;
    };
    let app = Router::new()
        .route("/api/tax/:id", get(tax_controller::get_tax_by_id))
        .route("/api/tax/delete/:id", delete(tax_controller::delete_tax))
        .with_state(state);

    let id = ObjectId::new().to_hex();

    let req = Request::builder()
        .uri(format!("/api/tax/{id}"))
        .body(axum::body::Body::empty())
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let req = Request::builder()
        .method("DELETE")
        .uri(format!("/api/tax/delete/{id}"))
        .body(axum::body::Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body = response_json(res).await;
    assert_eq!(body["message"], "Tax record not found");
}
