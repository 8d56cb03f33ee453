//! Session expiry, re-verification and health endpoints.

use eshop_integration_tests::TestContext;
use eshop_integration_tests::fake_api::{STALE_EMAIL, STALE_PASSWORD, USER_EMAIL, USER_PASSWORD};
use reqwest::StatusCode;

#[tokio::test]
async fn test_expired_token_ends_session() {
    let ctx = TestContext::new().await;

    let page = ctx.login(STALE_EMAIL, STALE_PASSWORD).await;

    assert!(page.shows("Your session has expired. Please login again."));
    assert!(!page.shows("LOGOUT"));

    let page = ctx.get("/orders").await;
    assert_eq!(page.path, "/login");
}

#[tokio::test]
async fn test_rejected_token_ends_session_on_recheck() {
    let ctx = TestContext::with_env(&[("ESHOP_AUTH_RECHECK_SECS", "0")]).await;
    ctx.login(USER_EMAIL, USER_PASSWORD).await;

    let page = ctx.get("/products").await;
    assert!(page.shows("LOGOUT"));

    ctx.api.revoke_tokens().await;
    let page = ctx.get("/products").await;

    assert!(page.shows("Your session has expired. Please login again."));
    assert!(!page.shows("LOGOUT"));
}

#[tokio::test]
async fn test_home_header_links() {
    let ctx = TestContext::new().await;

    let page = ctx.get("/").await;
    assert!(page.shows("Welcome to E-Shop"));
    assert!(page.shows("href=\"/login\""));

    ctx.login(USER_EMAIL, USER_PASSWORD).await;
    let page = ctx.get("/").await;
    assert!(page.shows("Products Page"));
}

#[tokio::test]
async fn test_health_endpoints() {
    let ctx = TestContext::new().await;

    let page = ctx.get("/health").await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.body, "ok");

    let page = ctx.get("/health/ready").await;
    assert_eq!(page.status, StatusCode::OK);
}

#[tokio::test]
async fn test_static_assets_served() {
    let ctx = TestContext::new().await;

    let page = ctx.get("/static/css/main.css").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.shows(".site-header"));
}
