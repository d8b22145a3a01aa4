// handlers/protected/wishlists.rs - wishlist listing for the authenticated owner

use axum::{
    extract::{Extension, Path, State},
    Json,
};

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::store::{Collection, Document, Filter};

/// GET /wishlists/:email - entries owned by the authenticated caller
///
/// The caller may only list their own wishlist: the token identity must equal
/// `:email` exactly, otherwise the request is rejected before the store is queried.
pub async fn owner_wishlist(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(email): Path<String>,
) -> ApiResult<Json<Vec<Document>>> {
    if user.email != email {
        tracing::warn!(caller = %user.email, requested = %email, "Wishlist ownership check failed");
        return Err(ApiError::forbidden("Forbidden access"));
    }

    let entries = state
        .store
        .find(Collection::Wishlists, &Filter::all().eq("owner", email))
        .await?;
    Ok(Json(entries))
}
