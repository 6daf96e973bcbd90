use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::filter::Filter;

use super::store::{DocumentStore, Hit, StoreError, WriteOutcome, WriteResult};

#[derive(Debug, Default)]
struct MemoryIndex {
    settings: Option<Value>,
    // insertion order keeps pagination stable
    documents: Vec<(String, Map<String, Value>)>,
}

/// In-process document store evaluating filters with [`Filter::matches_document`].
///
/// Writes are immediately visible, so `refresh` is a no-op.
#[derive(Debug, Default)]
pub struct MemoryStore {
    indices: RwLock<HashMap<String, MemoryIndex>>,
    reject_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, `index` reports a `noop` result instead of creating the document
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Insert a document under a caller-chosen id
    pub async fn insert_with_id(&self, index: &str, id: &str, document: Map<String, Value>) {
        let mut indices = self.indices.write().await;
        let entry = indices.entry(index.to_string()).or_default();
        entry.documents.retain(|(existing, _)| existing != id);
        entry.documents.push((id.to_string(), document));
    }

    pub async fn document_count(&self, index: &str) -> usize {
        self.indices
            .read()
            .await
            .get(index)
            .map(|i| i.documents.len())
            .unwrap_or(0)
    }

    pub async fn settings(&self, index: &str) -> Option<Value> {
        self.indices.read().await.get(index).and_then(|i| i.settings.clone())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn search(&self, filter: &Filter) -> Result<Vec<Hit>, StoreError> {
        let indices = self.indices.read().await;
        let Some(index) = indices.get(filter.index()) else {
            return Ok(vec![]);
        };

        let from = filter.from().unwrap_or(0) as usize;
        let size = filter.size().unwrap_or(10) as usize;
        Ok(index
            .documents
            .iter()
            .filter(|(id, source)| filter.matches_document(id, source))
            .skip(from)
            .take(size)
            .map(|(id, source)| Hit::new(id.clone(), source.clone()))
            .collect())
    }

    async fn index(&self, index: &str, document: Map<String, Value>) -> Result<WriteOutcome, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        if self.reject_writes.load(Ordering::SeqCst) {
            return Ok(WriteOutcome { id, result: WriteResult::Noop });
        }
        let mut indices = self.indices.write().await;
        indices
            .entry(index.to_string())
            .or_default()
            .documents
            .push((id.clone(), document));
        Ok(WriteOutcome { id, result: WriteResult::Created })
    }

    async fn update(&self, index: &str, id: &str, partial: Map<String, Value>) -> Result<WriteOutcome, StoreError> {
        let mut indices = self.indices.write().await;
        let existing = indices
            .get_mut(index)
            .and_then(|i| i.documents.iter_mut().find(|(doc_id, _)| doc_id == id));

        let Some((_, source)) = existing else {
            return Ok(WriteOutcome { id: id.to_string(), result: WriteResult::NotFound });
        };

        let mut changed = false;
        for (key, value) in partial {
            if source.get(&key) != Some(&value) {
                source.insert(key, value);
                changed = true;
            }
        }

        let result = if changed { WriteResult::Updated } else { WriteResult::Noop };
        Ok(WriteOutcome { id: id.to_string(), result })
    }

    async fn delete_by_query(&self, filter: &Filter) -> Result<u64, StoreError> {
        let mut indices = self.indices.write().await;
        let Some(index) = indices.get_mut(filter.index()) else {
            return Ok(0);
        };
        let before = index.documents.len();
        index.documents.retain(|(id, source)| !filter.matches_document(id, source));
        Ok((before - index.documents.len()) as u64)
    }

    async fn refresh(&self, _index: &str) -> Result<(), StoreError> {
        Ok(())
    }

    async fn index_exists(&self, index: &str) -> Result<bool, StoreError> {
        Ok(self.indices.read().await.contains_key(index))
    }

    async fn create_index(&self, index: &str, settings: Value) -> Result<(), StoreError> {
        let mut indices = self.indices.write().await;
        if indices.contains_key(index) {
            return Err(StoreError::Status {
                status: 400,
                body: format!("resource_already_exists_exception: index [{}] already exists", index),
            });
        }
        indices.insert(
            index.to_string(),
            MemoryIndex { settings: Some(settings), documents: vec![] },
        );
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn search_respects_window_and_order() {
        let store = MemoryStore::new();
        for n in 0..5 {
            store.index("needs", doc(json!({ "Kind": "need", "N": n }))).await.unwrap();
        }

        let mut filter = Filter::new("needs").unwrap();
        filter.term("Kind", "need").unwrap();
        filter.window(1, 2);

        let hits = store.search(&filter).await.unwrap();
        let numbers: Vec<_> = hits.iter().map(|h| h.source["N"].clone()).collect();
        assert_eq!(numbers, vec![json!(1), json!(2)]);
    }

    #[tokio::test]
    async fn missing_index_searches_empty() {
        let store = MemoryStore::new();
        let filter = Filter::new("nowhere").unwrap();
        assert!(store.search(&filter).await.unwrap().is_empty());
        assert_eq!(store.delete_by_query(&filter).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_merges_and_reports_noop() {
        let store = MemoryStore::new();
        let created = store.index("needs", doc(json!({ "Title": "a", "Rate": 1 }))).await.unwrap();
        assert_eq!(created.result, WriteResult::Created);

        let updated = store.update("needs", &created.id, doc(json!({ "Rate": 2 }))).await.unwrap();
        assert_eq!(updated.result, WriteResult::Updated);

        let noop = store.update("needs", &created.id, doc(json!({ "Rate": 2 }))).await.unwrap();
        assert_eq!(noop.result, WriteResult::Noop);

        let missing = store.update("needs", "nope", doc(json!({ "Rate": 2 }))).await.unwrap();
        assert_eq!(missing.result, WriteResult::NotFound);

        let mut filter = Filter::new("needs").unwrap();
        filter.term("_id", created.id.as_str()).unwrap();
        let hit = store.search(&filter).await.unwrap().remove(0);
        assert_eq!(hit.source, doc(json!({ "Title": "a", "Rate": 2 })));
    }

    #[tokio::test]
    async fn rejected_writes_do_not_persist() {
        let store = MemoryStore::new();
        store.set_reject_writes(true);
        let outcome = store.index("needs", doc(json!({ "Title": "a" }))).await.unwrap();
        assert_eq!(outcome.result, WriteResult::Noop);
        assert_eq!(store.document_count("needs").await, 0);
    }

    #[tokio::test]
    async fn create_index_twice_fails() {
        let store = MemoryStore::new();
        store.create_index("users", json!({})).await.unwrap();
        assert!(store.index_exists("users").await.unwrap());
        assert!(store.create_index("users", json!({})).await.is_err());
    }
}
