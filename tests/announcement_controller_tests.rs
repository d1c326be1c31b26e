use std::time::Duration;

use axum::{
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use mongodb::{bson::oid::ObjectId, options::ClientOptions, Client};
use artista::{config, models::{CurrentUser, Role}, routes::announcement_routes, services, AppState};
use tower::ServiceExt;

async fn test_state() -> AppState {
    let settings = config::load();

    let mut opts = ClientOptions::parse(&settings.mongodb_uri)
        .await
        .expect("mongodb options");
    opts.server_selection_timeout = Some(Duration::from_secs(2));
    let client = Client::with_options(opts).expect("mongodb client");
    let db = client.database(&settings.mongodb_db);

    let rates = services::exchange_rate::ExchangeRateClient::from_settings(&settings);

    AppState { db, settings, rates }
}

async fn app() -> Router {
    announcement_routes::add_routes(Router::new()).with_state(test_state().await)
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

fn request(method: &str, uri: &str, body: &str, caller: CurrentUser) -> Request<axum::body::Body> {
    let mut req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap();
    req.extensions_mut().insert(caller);
    req
}

#[tokio::test]
async fn create_announcement_without_text_returns_400() {
    let res = app()
        .await
        .oneshot(request("POST", "/api/announcements", r#"{"announcement":"   "}"#, user(Role::Admin)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_json(res).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Missing required fields");
}

#[tokio::test]
async fn create_announcement_with_bad_admin_id_returns_400() {
    let res = app()
        .await
        .oneshot(request(
            "POST",
            "/api/announcements",
            r#"{"announcement":"Office closed Friday","admin":"someone"}"#,
            user(Role::Admin),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_json(res).await;
    assert_eq!(body["message"], "Invalid admin id");
}

#[tokio::test]
async fn update_announcement_malformed_id_returns_404() {
    let res = app()
        .await
        .oneshot(request(
            "PUT",
            "/api/announcements/update/abc",
            r#"{"status":"inactive"}"#,
            user(Role::Admin),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body = response_json(res).await;
    assert_eq!(body["message"], "Announcement not found");
}

#[tokio::test]
async fn delete_announcement_malformed_id_returns_404() {
    let res = app()
        .await
        .oneshot(request("DELETE", "/api/announcements/delete/abc", "", user(Role::Admin)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn employee_cannot_list_all_announcements() {
    let res = app()
        .await
        .oneshot(request("GET", "/api/announcements", "", user(Role::Employee)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let body = response_json(res).await;
    assert_eq!(body["message"], "Access denied. Admins only.");
}

#[tokio::test]
async fn employee_can_read_active_announcements() {
    let res = app()
        .await
        .oneshot(request("GET", "/api/announcements/active/announcement", "", user(Role::Employee)))
        .await
        .unwrap();

    // 200 with a database, 500 without one; never an access error
    assert_ne!(res.status(), StatusCode::UNAUTHORIZED);
    assert_ne!(res.status(), StatusCode::FORBIDDEN);
    assert_ne!(res.status(), StatusCode::NOT_FOUND);
}
