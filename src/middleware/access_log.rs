use axum::{extract::Request, middleware::Next, response::Response};

/// Records method and path of each request passing through. Never alters the request.
pub async fn access_log(request: Request, next: Next) -> Response {
    tracing::info!(
        method = %request.method(),
        path = %request.uri().path(),
        "access"
    );
    next.run(request).await
}
