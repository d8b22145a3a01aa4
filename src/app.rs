use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{CookiePolicy, TokenService};
use crate::config::AppConfig;
use crate::handlers::{protected, public};
use crate::middleware::{access_log, token_guard};
use crate::store::DocumentStore;

/// Process-wide resources shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub tokens: Arc<TokenService>,
    pub cookies: CookiePolicy,
}

impl AppState {
    pub fn new(config: &AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            tokens: Arc::new(TokenService::new(
                config.security.token_secret.as_bytes(),
                config.security.token_ttl_secs,
            )),
            cookies: CookiePolicy::new(config.security.cookie_secure),
        }
    }
}

pub fn app(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        // Public
        .route("/", get(public::root::root))
        .route("/health", get(public::root::health))
        .merge(auth_routes())
        .merge(blog_routes())
        .merge(comment_routes())
        .merge(wishlist_routes())
        .route("/authors", get(public::authors::list_authors))
        // Guarded
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/jwt", post(auth::issue_token))
        .route("/logout", post(auth::logout))
}

fn blog_routes() -> Router<AppState> {
    use public::blogs;

    Router::new()
        .route("/recent_blogs", get(blogs::list_recent_blogs))
        .route("/recent_blogs/:id", get(blogs::recent_blog))
        .route("/add_blog", get(blogs::list_blogs).post(blogs::create_blog))
        .route("/add_blog/:id", get(blogs::get_blog).put(blogs::update_blog))
}

fn comment_routes() -> Router<AppState> {
    use public::comments;

    Router::new()
        .route(
            "/all_comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route("/all_comments/:id", get(comments::comments_for))
}

fn wishlist_routes() -> Router<AppState> {
    use public::wishlists;

    Router::new()
        .route(
            "/wishlists",
            get(wishlists::list_wishlists).post(wishlists::create_wishlist_entry),
        )
        .route("/wishlists/:email/:id", delete(wishlists::delete_wishlist_entry))
}

// Layers run outermost-last: access log first, then the token guard.
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/wishlists/:email", get(protected::owner_wishlist))
        .route_layer(middleware::from_fn_with_state(state, token_guard))
        .route_layer(middleware::from_fn(access_log))
}

/// Credentialed CORS restricted to the configured origins.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            // Wildcards are not allowed together with credentials.
            Ok(value) if value != "*" => Some(value),
            _ => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
}
