use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    apply_set, project, with_id, Collection, DeleteResult, Document, DocumentId, DocumentStore, Filter,
    InsertOneResult, StoreError, UpdateResult, ID_FIELD,
};

/// Process-local store keeping documents in insertion order.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Vec<(DocumentId, Document)>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let docs = collections
            .get(&collection)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(id, doc)| filter.matches(id, doc))
                    .map(|(id, doc)| with_id(*id, doc.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Ok(docs)
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
        projection: Option<&[&str]>,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        let found = collections.get(&collection).and_then(|entries| {
            entries
                .iter()
                .find(|(id, doc)| filter.matches(id, doc))
                .map(|(id, doc)| project(with_id(*id, doc.clone()), projection))
        });
        Ok(found)
    }

    async fn insert_one(&self, collection: Collection, mut doc: Document) -> Result<InsertOneResult, StoreError> {
        doc.remove(ID_FIELD);
        let id = DocumentId::new();
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .push((id, doc));
        Ok(InsertOneResult { acknowledged: true, inserted_id: id })
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
        upsert: bool,
    ) -> Result<UpdateResult, StoreError> {
        let mut collections = self.collections.write().await;
        let entries = collections.entry(collection).or_default();

        if let Some((_, doc)) = entries.iter_mut().find(|(id, doc)| filter.matches(id, doc)) {
            let modified = apply_set(doc, set);
            return Ok(UpdateResult {
                acknowledged: true,
                matched_count: 1,
                modified_count: u64::from(modified),
                upserted_count: 0,
                upserted_id: None,
            });
        }

        if !upsert {
            return Ok(UpdateResult {
                acknowledged: true,
                matched_count: 0,
                modified_count: 0,
                upserted_count: 0,
                upserted_id: None,
            });
        }

        let id = DocumentId::new();
        let mut doc = Document::new();
        apply_set(&mut doc, set);
        entries.push((id, doc));
        Ok(UpdateResult {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some(id),
        })
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<DeleteResult, StoreError> {
        let mut collections = self.collections.write().await;
        let deleted = match collections.get_mut(&collection) {
            Some(entries) => match entries.iter().position(|(id, doc)| filter.matches(id, doc)) {
                Some(index) => {
                    entries.remove(index);
                    1
                }
                None => 0,
            },
            None => 0,
        };
        Ok(DeleteResult { acknowledged: true, deleted_count: deleted })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
