// handlers/public/authors.rs - author listing

use axum::{extract::State, Json};

use crate::app::AppState;
use crate::error::ApiResult;
use crate::store::{Collection, Document, Filter};

/// GET /authors
pub async fn list_authors(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    let authors = state.store.find(Collection::Authors, &Filter::all()).await?;
    Ok(Json(authors))
}
