use serde_json::{Map, Value};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::database::error::DatabaseError;
use crate::database::models::{fields, FromHit};
use crate::database::query_builder::QueryBuilder;
use crate::database::store::{DocumentStore, WriteResult};

/// CRUD over one record kind in one index
pub struct Repository<T> {
    index: String,
    store: Arc<dyn DocumentStore>,
    _phantom: PhantomData<T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            index: self.index.clone(),
            store: self.store.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T: FromHit> Repository<T> {
    pub fn new(index: impl Into<String>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            index: index.into(),
            store,
            _phantom: PhantomData,
        }
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn query(&self) -> Result<QueryBuilder<T>, DatabaseError> {
        QueryBuilder::new(&self.index)
    }

    pub async fn select_any(&self, query: QueryBuilder<T>) -> Result<Vec<T>, DatabaseError> {
        query.select_all(self.store.as_ref()).await
    }

    pub async fn select_one(&self, query: QueryBuilder<T>) -> Result<Option<T>, DatabaseError> {
        query.select_optional(self.store.as_ref()).await
    }

    pub async fn select_id(&self, id: &str) -> Result<Option<T>, DatabaseError> {
        self.select_one(self.query()?.id(id)?).await
    }

    /// Index `document`, make it visible, and read it back.
    ///
    /// Returns `None` when the store reports anything other than a creation.
    pub async fn create(&self, mut document: Map<String, Value>) -> Result<Option<T>, DatabaseError> {
        document.insert(fields::KIND.to_string(), Value::String(T::KIND.to_string()));

        let outcome = self.store.index(&self.index, document).await?;
        if outcome.result != WriteResult::Created {
            warn!(index = %self.index, kind = T::KIND, result = ?outcome.result, "document was not created");
            return Ok(None);
        }

        self.store.refresh(&self.index).await?;
        debug!(index = %self.index, kind = T::KIND, id = %outcome.id, "created");
        self.select_id(&outcome.id).await
    }

    /// Merge `partial` into the record; true only when the store changed it
    pub async fn update(&self, id: &str, partial: Map<String, Value>) -> Result<bool, DatabaseError> {
        if partial.is_empty() {
            return Ok(false);
        }
        let outcome = self.store.update(&self.index, id, partial).await?;
        Ok(outcome.result == WriteResult::Updated)
    }

    pub async fn delete_id(&self, id: &str) -> Result<bool, DatabaseError> {
        let deleted = self.query()?.id(id)?.delete(self.store.as_ref()).await?;
        Ok(deleted > 0)
    }
}
