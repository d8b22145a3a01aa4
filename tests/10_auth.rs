mod common;

use anyhow::Result;
use axum::http::{header, Method, StatusCode};
use chrono::{Duration, Utc};
use serde_json::json;

use blog_portal_api::auth::{Identity, TokenService};

#[tokio::test]
async fn root_reports_liveness() -> Result<()> {
    let app = common::spawn_app();
    let res = app.get("/").await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!("Blog portal server is running"));
    Ok(())
}

#[tokio::test]
async fn health_reports_store_status() -> Result<()> {
    let app = common::spawn_app();
    let res = app.get("/health").await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn jwt_sets_http_only_cross_site_cookie() -> Result<()> {
    let app = common::spawn_app();
    let res = app.post("/jwt", json!({ "email": "alice@x.com" })).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!({ "success": true }));

    let cookie = res.set_cookie().expect("Set-Cookie header");
    assert!(cookie.starts_with("token="), "cookie: {}", cookie);
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Secure"));
    assert!(cookie.contains("SameSite=None"));

    // The issued token verifies back to the presented identity.
    let token = cookie["token=".len()..].split(';').next().unwrap_or_default();
    let identity = app.tokens.verify(token)?;
    assert_eq!(identity, Identity { email: "alice@x.com".to_string() });
    Ok(())
}

#[tokio::test]
async fn logout_clears_cookie() -> Result<()> {
    let app = common::spawn_app();
    let cookie = common::token_cookie(&app.tokens, "alice@x.com");
    let res = common::send(&app.router, Method::POST, "/logout", None, Some(&cookie)).await?;
    assert_eq!(res.status, StatusCode::OK);

    let cleared = res.set_cookie().expect("Set-Cookie header");
    assert!(cleared.starts_with("token=;"), "cookie: {}", cleared);
    assert!(cleared.contains("Max-Age=0"));
    Ok(())
}

#[tokio::test]
async fn guarded_route_without_cookie_is_unauthorized() -> Result<()> {
    let app = common::spawn_app();
    let res = app.get("/wishlists/alice@x.com").await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["code"], "UNAUTHORIZED");
    assert_eq!(app.store.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn guarded_route_rejects_invalid_tokens() -> Result<()> {
    let app = common::spawn_app();
    let identity = Identity { email: "alice@x.com".to_string() };

    let expired = app.tokens.issue_at(&identity, Utc::now() - Duration::hours(2))?;
    let foreign = TokenService::new(b"someone-else", 3600).issue(&identity)?;

    for token in [expired.as_str(), foreign.as_str(), "garbage"] {
        let cookie = format!("token={}", token);
        let res = app.get_with_cookie("/wishlists/alice@x.com", &cookie).await?;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "token {}", token);
    }
    assert_eq!(app.store.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn cors_allows_configured_origin_with_credentials() -> Result<()> {
    let app = common::spawn_app();
    let request = axum::http::Request::builder()
        .method(Method::OPTIONS)
        .uri("/wishlists")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(axum::body::Body::empty())?;

    use tower::ServiceExt;
    let res = app.router.clone().oneshot(request).await?;
    let headers = res.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).and_then(|v| v.to_str().ok()),
        Some("http://localhost:5173")
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).and_then(|v| v.to_str().ok()),
        Some("true")
    );
    Ok(())
}

#[tokio::test]
async fn cors_ignores_unknown_origin() -> Result<()> {
    let app = common::spawn_app();
    let request = axum::http::Request::builder()
        .uri("/authors")
        .header(header::ORIGIN, "https://evil.example")
        .body(axum::body::Body::empty())?;

    use tower::ServiceExt;
    let res = app.router.clone().oneshot(request).await?;
    assert!(res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    Ok(())
}
