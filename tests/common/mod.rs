#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use blog_portal_api::auth::{Identity, TokenService};
use blog_portal_api::config::AppConfig;
use blog_portal_api::store::{
    Collection, DeleteResult, Document, DocumentStore, Filter, InsertOneResult, MemoryDocumentStore, StoreError,
    UpdateResult,
};
use blog_portal_api::{app, AppState};

pub const SECRET: &str = "integration-test-secret";

/// Memory store that counts every call so tests can assert a handler never reached it.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryDocumentStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for CountingStore {
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        self.hit();
        self.inner.find(collection, filter).await
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
        projection: Option<&[&str]>,
    ) -> Result<Option<Document>, StoreError> {
        self.hit();
        self.inner.find_one(collection, filter, projection).await
    }

    async fn insert_one(&self, collection: Collection, doc: Document) -> Result<InsertOneResult, StoreError> {
        self.hit();
        self.inner.insert_one(collection, doc).await
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
        upsert: bool,
    ) -> Result<UpdateResult, StoreError> {
        self.hit();
        self.inner.update_one(collection, filter, set, upsert).await
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<DeleteResult, StoreError> {
        self.hit();
        self.inner.delete_one(collection, filter).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }
}

/// Store whose every call fails as if the database were down.
pub struct UnavailableStore;

#[async_trait]
impl DocumentStore for UnavailableStore {
    async fn find(&self, _: Collection, _: &Filter) -> Result<Vec<Document>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn find_one(
        &self,
        _: Collection,
        _: &Filter,
        _: Option<&[&str]>,
    ) -> Result<Option<Document>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn insert_one(&self, _: Collection, _: Document) -> Result<InsertOneResult, StoreError> {
        Err(StoreError::Query("relation \"blogs\" does not exist".into()))
    }

    async fn update_one(&self, _: Collection, _: &Filter, _: Document, _: bool) -> Result<UpdateResult, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn delete_one(&self, _: Collection, _: &Filter) -> Result<DeleteResult, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<CountingStore>,
    pub tokens: TokenService,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn set_cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

pub fn config() -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "ACCESS_TOKEN_SECRET" => Some(SECRET.to_string()),
        _ => None,
    })
    .expect("test config")
}

pub fn spawn_app() -> TestApp {
    let config = config();
    let store = Arc::new(CountingStore::default());
    let state = AppState::new(&config, store.clone());
    TestApp {
        router: app(state, &config.security.cors_origins),
        store,
        tokens: TokenService::new(SECRET.as_bytes(), config.security.token_ttl_secs),
    }
}

pub fn spawn_app_with_store(store: Arc<dyn DocumentStore>) -> Router {
    let config = config();
    app(AppState::new(&config, store), &config.security.cors_origins)
}

pub fn token_cookie(tokens: &TokenService, email: &str) -> String {
    let token = tokens
        .issue(&Identity { email: email.to_string() })
        .expect("issue token");
    format!("token={}", token)
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> Result<TestResponse> {
        send(&self.router, Method::GET, uri, None, None).await
    }

    pub async fn get_with_cookie(&self, uri: &str, cookie: &str) -> Result<TestResponse> {
        send(&self.router, Method::GET, uri, None, Some(cookie)).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Result<TestResponse> {
        send(&self.router, Method::POST, uri, Some(body), None).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> Result<TestResponse> {
        send(&self.router, Method::PUT, uri, Some(body), None).await
    }

    pub async fn delete(&self, uri: &str) -> Result<TestResponse> {
        send(&self.router, Method::DELETE, uri, None, None).await
    }

    /// Inserts a document through the API and returns its identifier.
    pub async fn create(&self, uri: &str, body: Value) -> Result<String> {
        let res = self.post(uri, body).await?;
        assert_eq!(res.status, StatusCode::OK, "create failed: {}", res.body);
        res.body["insertedId"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("missing insertedId in {}", res.body))
    }
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    cookie: Option<&str>,
) -> Result<TestResponse> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    Ok(TestResponse { status, headers, body })
}
