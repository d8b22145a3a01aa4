// handlers/public/auth.rs - token issuance and logout
//
// POST /jwt     body { "email": "..." } -> sets the `token` cookie
// POST /logout  clears the `token` cookie

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::Identity;
use crate::error::ApiResult;

/// POST /jwt - issue a one-hour token for the presented identity
///
/// No user record is consulted: the identity in the body is trusted as-is.
pub async fn issue_token(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(identity): Json<Identity>,
) -> ApiResult<(CookieJar, Json<Value>)> {
    let token = state.tokens.issue(&identity)?;
    tracing::info!(email = %identity.email, "Issued token");

    let jar = jar.add(state.cookies.token_cookie(token));
    Ok((jar, Json(json!({ "success": true }))))
}

/// POST /logout - expire the token cookie
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Value>) {
    let jar = jar.add(state.cookies.cleared_cookie());
    (jar, Json(json!({ "success": true })))
}
