//! Document store abstraction.
//!
//! Documents are loosely-schemaed JSON objects grouped in a fixed set of
//! collections. Every document returned by a store carries its identifier
//! under `_id`.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// A stored document: an arbitrary JSON object.
pub type Document = Map<String, Value>;

/// Field under which a document's identifier is exposed.
pub const ID_FIELD: &str = "_id";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("query error: {0}")]
    Query(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
            other => StoreError::Query(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Blogs,
    Comments,
    Wishlists,
    Authors,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Blogs,
        Collection::Comments,
        Collection::Wishlists,
        Collection::Authors,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Blogs => "blogs",
            Collection::Comments => "comments",
            Collection::Wishlists => "wishlists",
            Collection::Authors => "authors",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store-native document identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| StoreError::InvalidIdentifier(raw.to_string()))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for DocumentId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Conjunction of an optional identifier match and field equalities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub id: Option<DocumentId>,
    pub fields: Vec<(String, Value)>,
}

impl Filter {
    /// Matches every document.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: DocumentId) -> Self {
        Self { id: Some(id), fields: Vec::new() }
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((field.into(), value.into()));
        self
    }

    pub fn matches(&self, id: &DocumentId, doc: &Document) -> bool {
        if self.id.is_some_and(|wanted| wanted != *id) {
            return false;
        }
        self.fields
            .iter()
            .all(|(field, value)| doc.get(field) == Some(value))
    }

    /// JSON object the matching documents must contain (all field equalities).
    pub fn containment(&self) -> Value {
        let object: Document = self.fields.iter().cloned().collect();
        Value::Object(object)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
    pub acknowledged: bool,
    pub inserted_id: DocumentId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<DocumentId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// Operations every backing store provides. Implementations are shared across
/// concurrent requests and must not assume exclusive access.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents matching `filter`, in the store's natural order.
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, StoreError>;

    /// First matching document, reduced to `projection` (plus `_id`) when given.
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
        projection: Option<&[&str]>,
    ) -> Result<Option<Document>, StoreError>;

    /// Inserts `doc` under a freshly assigned identifier. A client-supplied `_id` is ignored.
    async fn insert_one(&self, collection: Collection, doc: Document) -> Result<InsertOneResult, StoreError>;

    /// Sets the fields of `set` on the first matching document. With `upsert`,
    /// a miss inserts `set` as a new document under a fresh identifier.
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
        upsert: bool,
    ) -> Result<UpdateResult, StoreError>;

    /// Deletes at most one matching document.
    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<DeleteResult, StoreError>;

    /// Connectivity check.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Attaches the identifier to a stored body for output.
pub(crate) fn with_id(id: DocumentId, mut doc: Document) -> Document {
    doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    doc
}

/// Keeps only `_id` and the listed fields.
pub(crate) fn project(doc: Document, projection: Option<&[&str]>) -> Document {
    match projection {
        None => doc,
        Some(fields) => doc
            .into_iter()
            .filter(|(key, _)| key == ID_FIELD || fields.contains(&key.as_str()))
            .collect(),
    }
}

/// Merges `set` into `doc`, returning whether any stored value changed.
pub(crate) fn apply_set(doc: &mut Document, set: Document) -> bool {
    let mut changed = false;
    for (key, value) in set {
        if key == ID_FIELD {
            continue;
        }
        if doc.get(&key) != Some(&value) {
            doc.insert(key, value);
            changed = true;
        }
    }
    changed
}
