// handlers/public/comments.rs - comment create and listing by commentId

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::app::AppState;
use crate::error::ApiResult;
use crate::handlers::into_document;
use crate::store::{Collection, Document, Filter, InsertOneResult};

/// POST /all_comments
pub async fn create_comment(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<Json<InsertOneResult>> {
    let ack = state
        .store
        .insert_one(Collection::Comments, into_document(body)?)
        .await?;
    Ok(Json(ack))
}

/// GET /all_comments
pub async fn list_comments(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    let comments = state.store.find(Collection::Comments, &Filter::all()).await?;
    Ok(Json(comments))
}

/// GET /all_comments/:id - comments whose `commentId` equals `:id`
///
/// `:id` is the commented blog's id as the client stored it, so it is matched
/// as a plain string rather than parsed.
pub async fn comments_for(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> ApiResult<Json<Vec<Document>>> {
    let comments = state
        .store
        .find(Collection::Comments, &Filter::all().eq("commentId", comment_id))
        .await?;
    Ok(Json(comments))
}
