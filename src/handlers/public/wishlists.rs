// handlers/public/wishlists.rs - wishlist create, listing and owner-scoped delete

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::app::AppState;
use crate::error::ApiResult;
use crate::handlers::{into_document, parse_id};
use crate::store::{Collection, DeleteResult, Document, Filter, InsertOneResult};

/// POST /wishlists
pub async fn create_wishlist_entry(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<Json<InsertOneResult>> {
    let ack = state
        .store
        .insert_one(Collection::Wishlists, into_document(body)?)
        .await?;
    Ok(Json(ack))
}

/// GET /wishlists
pub async fn list_wishlists(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    let entries = state.store.find(Collection::Wishlists, &Filter::all()).await?;
    Ok(Json(entries))
}

/// DELETE /wishlists/:email/:id - remove one entry matching both id and owner
pub async fn delete_wishlist_entry(
    State(state): State<AppState>,
    Path((email, id)): Path<(String, String)>,
) -> ApiResult<Json<DeleteResult>> {
    let filter = Filter::by_id(parse_id(&id)?).eq("owner", email);
    let ack = state.store.delete_one(Collection::Wishlists, &filter).await?;
    Ok(Json(ack))
}
