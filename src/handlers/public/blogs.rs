// handlers/public/blogs.rs - blog listing, detail, create and update

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::handlers::{into_document, parse_id};
use crate::store::{Collection, Document, Filter, InsertOneResult, UpdateResult};

/// Blog fields clients may edit, also the projection for the recent-blog detail view.
pub const BLOG_FIELDS: [&str; 6] = [
    "title",
    "image",
    "category",
    "short_description",
    "long_description",
    "email",
];

/// GET /recent_blogs
pub async fn list_recent_blogs(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    let blogs = state.store.find(Collection::Blogs, &Filter::all()).await?;
    Ok(Json(blogs))
}

/// GET /recent_blogs/:id - blog detail reduced to the display fields
pub async fn recent_blog(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Document>> {
    let filter = Filter::by_id(parse_id(&id)?);
    state
        .store
        .find_one(Collection::Blogs, &filter, Some(&BLOG_FIELDS[..]))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Blog {} not found", id)))
}

/// POST /add_blog
pub async fn create_blog(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<Json<InsertOneResult>> {
    let ack = state.store.insert_one(Collection::Blogs, into_document(body)?).await?;
    tracing::info!(id = %ack.inserted_id, "Created blog");
    Ok(Json(ack))
}

/// GET /add_blog
pub async fn list_blogs(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    let blogs = state.store.find(Collection::Blogs, &Filter::all()).await?;
    Ok(Json(blogs))
}

/// GET /add_blog/:id
pub async fn get_blog(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Document>> {
    let filter = Filter::by_id(parse_id(&id)?);
    state
        .store
        .find_one(Collection::Blogs, &filter, None)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Blog {} not found", id)))
}

/// PUT /add_blog/:id - set the editable fields present in the body
///
/// Fields outside `BLOG_FIELDS` are ignored and editable fields missing from
/// the body keep their stored value. An unknown id creates a new blog under a
/// fresh identifier.
pub async fn update_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Json<UpdateResult>> {
    let filter = Filter::by_id(parse_id(&id)?);
    let set = editable_fields(into_document(body)?);

    let ack = state.store.update_one(Collection::Blogs, &filter, set, true).await?;
    if let Some(upserted) = ack.upserted_id {
        tracing::info!(requested = %id, id = %upserted, "Upserted blog");
    }
    Ok(Json(ack))
}

fn editable_fields(body: Document) -> Document {
    body.into_iter()
        .filter(|(key, _)| BLOG_FIELDS.contains(&key.as_str()))
        .collect()
}
