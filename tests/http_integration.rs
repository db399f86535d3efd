//! Integration tests for the HTTP surface.
//!
//! Requests go through the full router (session middleware included)
//! with `tower::ServiceExt::oneshot`; no socket is opened.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::Router;
use http::{header, Request, StatusCode};
use tower::ServiceExt;

use push_hub::adapters::{app_router, AppState, InMemorySessionStore, MockTransport, StaticCredentialVerifier};
use push_hub::application::ConnectionRegistry;
use push_hub::domain::foundation::{ConnectionId, UserId};
use push_hub::domain::realtime::CloseReason;

// =============================================================================
// Test Infrastructure
// =============================================================================

const COOKIE: &str = "push_hub_session";

struct TestApp {
    router: Router,
    registry: Arc<ConnectionRegistry>,
    sessions: Arc<InMemorySessionStore>,
}

fn test_app() -> TestApp {
    let registry = ConnectionRegistry::shared();
    let sessions = Arc::new(InMemorySessionStore::new());
    let credentials = StaticCredentialVerifier::parse("alice:wonderland,bob:builder").unwrap();
    let state = AppState::new(registry.clone(), sessions.clone(), Arc::new(credentials), COOKIE);

    TestApp {
        router: app_router(state),
        registry,
        sessions,
    }
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn login_request(username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("username={username}&password={password}")))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Logs in and returns the `name=value` cookie pair.
async fn login(app: &TestApp, username: &str, password: &str) -> String {
    let response = app
        .router
        .clone()
        .oneshot(login_request(username, password))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn health_returns_ok() {
    let app = test_app();
    let response = app.router.oneshot(get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
}

#[tokio::test]
async fn index_redirects_anonymous_users_to_login() {
    let app = test_app();
    let response = app.router.oneshot(get("/", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn login_page_renders_form() {
    let app = test_app();
    let response = app.router.oneshot(get("/login", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(r#"action="/login""#));
}

#[tokio::test]
async fn successful_login_sets_cookie_and_redirects_home() {
    let app = test_app();
    let response = app
        .router
        .clone()
        .oneshot(login_request("alice", "wonderland"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("push_hub_session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert_eq!(app.sessions.len().await, 1);
}

#[tokio::test]
async fn wrong_password_is_rejected_without_session() {
    let app = test_app();
    let response = app
        .router
        .clone()
        .oneshot(login_request("alice", "nope"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(body_text(response).await.contains("Invalid username or password"));
    assert!(app.sessions.is_empty().await);
}

#[tokio::test]
async fn index_greets_logged_in_user() {
    let app = test_app();
    let cookie = login(&app, "alice", "wonderland").await;

    let response = app.router.clone().oneshot(get("/", Some(&cookie))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Hello, alice"));
}

#[tokio::test]
async fn forged_cookie_is_treated_as_anonymous() {
    let app = test_app();
    let cookie = format!("{COOKIE}={}", uuid::Uuid::new_v4());

    let response = app.router.oneshot(get("/", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn logout_disconnects_user_and_revokes_session() {
    let app = test_app();
    let cookie = login(&app, "alice", "wonderland").await;

    let transport = Arc::new(MockTransport::new());
    let handle = app
        .registry
        .connect(
            ConnectionId::new(),
            UserId::new("alice").unwrap(),
            transport.clone(),
            None,
        )
        .await
        .unwrap();

    let response = app
        .router
        .clone()
        .oneshot(get("/logout", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
    let cleared = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cleared.starts_with("push_hub_session="));
    assert!(cleared.contains("Max-Age=0"));

    assert!(handle.is_closed());
    assert_eq!(transport.close_reasons(), vec![CloseReason::LoggedOut]);
    assert!(app.registry.online_users().await.is_empty());
    assert!(app.sessions.is_empty().await);

    let response = app.router.clone().oneshot(get("/", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn logout_without_session_just_redirects() {
    let app = test_app();
    let response = app.router.oneshot(get("/logout", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}
