use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::app::AppState;
use crate::auth::{Identity, TOKEN_COOKIE};
use crate::error::ApiError;

/// Authenticated caller extracted from the token cookie
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub email: String,
}

impl From<Identity> for AuthUser {
    fn from(identity: Identity) -> Self {
        Self { email: identity.email }
    }
}

/// Rejects requests without a valid token cookie; otherwise injects `AuthUser` and continues.
pub async fn token_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar
        .get(TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Missing token cookie"))?;

    let identity = state.tokens.verify(&token).map_err(|e| {
        tracing::warn!(reason = e.reason(), "Rejected token on guarded route");
        ApiError::from(e)
    })?;

    request.extensions_mut().insert(AuthUser::from(identity));

    Ok(next.run(request).await)
}
