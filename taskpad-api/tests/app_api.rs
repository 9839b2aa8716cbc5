/// Integration tests for cross-cutting router behavior: health, security
/// headers, CORS and body rejections

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::TestContext;
use sqlx::PgPool;
use tower::ServiceExt;

#[sqlx::test(migrations = "../migrations")]
async fn test_health_reports_database(pool: PgPool) {
    let ctx = TestContext::new(pool);

    let response = ctx.send(Method::GET, "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["database"], "connected");
    assert!(response.body["version"].is_string());
}

#[sqlx::test(migrations = "../migrations")]
async fn test_security_headers_on_api_errors(pool: PgPool) {
    let ctx = TestContext::with_env(pool, &[("APP_ENV", "production")]);

    let request = Request::builder().uri("/api/tasks").body(Body::empty()).unwrap();
    let response = ctx.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.get("strict-transport-security").is_some());
}

#[sqlx::test(migrations = "../migrations")]
async fn test_cors_restricted_to_configured_origins(pool: PgPool) {
    let ctx = TestContext::with_env(pool, &[("CORS_ORIGINS", "https://app.example")]);

    let preflight = |origin: &str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/tasks")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap()
    };

    let allowed = ctx.app.clone().oneshot(preflight("https://app.example")).await.unwrap();
    assert_eq!(
        allowed.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://app.example"
    );

    let denied = ctx.app.clone().oneshot(preflight("https://evil.example")).await.unwrap();
    assert!(denied.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[sqlx::test(migrations = "../migrations")]
async fn test_unparseable_body_is_bad_request(pool: PgPool) {
    let ctx = TestContext::new(pool);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = ctx.send_raw(request).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "bad_request");
}

#[sqlx::test(migrations = "../migrations")]
async fn test_unknown_path_is_not_found(pool: PgPool) {
    let ctx = TestContext::new(pool);

    let api = ctx.send(Method::GET, "/api/nope", None, None).await;
    assert_eq!(api.status, StatusCode::NOT_FOUND);
    assert_eq!(api.body["error"], "not_found");

    let other = ctx.send(Method::GET, "/nope", None, None).await;
    assert_eq!(other.status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../migrations")]
async fn test_client_bundle_is_served_with_index_fallback(pool: PgPool) {
    let bundle = tempfile::tempdir().unwrap();
    std::fs::write(bundle.path().join("index.html"), "<div id=\"app\"></div>").unwrap();
    std::fs::create_dir(bundle.path().join("assets")).unwrap();
    std::fs::write(bundle.path().join("assets/app.js"), "console.log('taskpad');").unwrap();

    let dir = bundle.path().to_str().unwrap().to_string();
    let ctx = TestContext::with_env(pool, &[("SPA_DIR", dir.as_str())]);

    let root = ctx.send(Method::GET, "/", None, None).await;
    assert_eq!(root.status, StatusCode::OK);
    assert_eq!(root.body, "<div id=\"app\"></div>");

    let asset = ctx.send(Method::GET, "/assets/app.js", None, None).await;
    assert_eq!(asset.status, StatusCode::OK);
    assert_eq!(asset.body, "console.log('taskpad');");

    let client_route = ctx.send(Method::GET, "/tasks/42/edit", None, None).await;
    assert_eq!(client_route.status, StatusCode::OK);
    assert_eq!(client_route.body, "<div id=\"app\"></div>");

    let api = ctx.send(Method::GET, "/api/unknown", None, None).await;
    assert_eq!(api.status, StatusCode::NOT_FOUND);
    assert_eq!(api.body["error"], "not_found");

    let health = ctx.send(Method::GET, "/health", None, None).await;
    assert_eq!(health.body["status"], "healthy");
}
