mod common;

use std::sync::Arc;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn unavailable_store_surfaces_as_503() -> Result<()> {
    let router = common::spawn_app_with_store(Arc::new(common::UnavailableStore));
    let res = common::send(&router, Method::GET, "/authors", None, None).await?;
    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.body["code"], "SERVICE_UNAVAILABLE");
    assert!(!res.body["message"].as_str().unwrap_or_default().contains("refused"));
    Ok(())
}

#[tokio::test]
async fn failed_query_surfaces_as_500_without_detail() -> Result<()> {
    let router = common::spawn_app_with_store(Arc::new(common::UnavailableStore));
    let res = common::send(&router, Method::POST, "/add_blog", Some(json!({ "title": "A" })), None).await?;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!res.body["message"].as_str().unwrap_or_default().contains("relation"));
    Ok(())
}

#[tokio::test]
async fn health_degrades_when_store_is_down() -> Result<()> {
    let router = common::spawn_app_with_store(Arc::new(common::UnavailableStore));
    let res = common::send(&router, Method::GET, "/health", None, None).await?;
    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.body["status"], "degraded");
    Ok(())
}
