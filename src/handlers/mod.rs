// handlers/mod.rs - HTTP handlers grouped by access level
//
// public/    routes open to any caller
// protected/ routes behind the token guard

use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::store::{Document, DocumentId};

pub mod protected;
pub mod public;

/// Request bodies for create and update must be JSON objects.
pub(crate) fn into_document(body: Value) -> ApiResult<Document> {
    match body {
        Value::Object(doc) => Ok(doc),
        _ => Err(ApiError::bad_request("Request body must be a JSON object")),
    }
}

pub(crate) fn parse_id(raw: &str) -> ApiResult<DocumentId> {
    Ok(DocumentId::parse(raw)?)
}
