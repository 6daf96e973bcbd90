use serde_json::Value;
use std::marker::PhantomData;

use crate::database::error::DatabaseError;
use crate::database::models::{fields, FromHit};
use crate::database::store::DocumentStore;
use crate::filter::{Filter, Pagination};

/// Typed query over one record kind.
///
/// Every query is scoped to `T::KIND`; the `_opt` builders skip absent or
/// empty values so callers can pass request parameters straight through.
pub struct QueryBuilder<T> {
    filter: Filter,
    _phantom: PhantomData<T>,
}

impl<T: FromHit> QueryBuilder<T> {
    pub fn new(index: impl Into<String>) -> Result<Self, DatabaseError> {
        let mut filter = Filter::new(index)?;
        filter.term(fields::KIND, T::KIND)?;
        Ok(Self {
            filter,
            _phantom: PhantomData,
        })
    }

    pub fn id(self, id: &str) -> Result<Self, DatabaseError> {
        self.term("_id", id)
    }

    pub fn term(mut self, field: &str, value: impl Into<Value>) -> Result<Self, DatabaseError> {
        self.filter.term(field, value)?;
        Ok(self)
    }

    pub fn term_opt(self, field: &str, value: Option<&str>) -> Result<Self, DatabaseError> {
        match non_empty(value) {
            Some(v) => self.term(field, v),
            None => Ok(self),
        }
    }

    pub fn match_phrase(mut self, field: &str, text: &str) -> Result<Self, DatabaseError> {
        self.filter.match_phrase(field, text)?;
        Ok(self)
    }

    pub fn match_phrase_opt(self, field: &str, text: Option<&str>) -> Result<Self, DatabaseError> {
        match non_empty(text) {
            Some(t) => self.match_phrase(field, t),
            None => Ok(self),
        }
    }

    pub fn matches(mut self, field: &str, text: &str) -> Result<Self, DatabaseError> {
        self.filter.matches(field, text)?;
        Ok(self)
    }

    pub fn matches_opt(self, field: &str, text: Option<&str>) -> Result<Self, DatabaseError> {
        match non_empty(text) {
            Some(t) => self.matches(field, t),
            None => Ok(self),
        }
    }

    pub fn window(mut self, from: u32, size: u32) -> Self {
        self.filter.window(from, size);
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.filter.paginate(pagination);
        self
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub async fn select_all(self, store: &dyn DocumentStore) -> Result<Vec<T>, DatabaseError> {
        let hits = store.search(&self.filter).await?;
        hits.iter()
            .map(|hit| T::from_hit(hit).map_err(DatabaseError::from))
            .collect()
    }

    pub async fn select_optional(self, store: &dyn DocumentStore) -> Result<Option<T>, DatabaseError> {
        let hits = store.search(&self.window(0, 1).filter).await?;
        match hits.first() {
            Some(hit) => Ok(Some(T::from_hit(hit)?)),
            None => Ok(None),
        }
    }

    /// Delete every matching record, returning how many were removed
    pub async fn delete(self, store: &dyn DocumentStore) -> Result<u64, DatabaseError> {
        Ok(store.delete_by_query(&self.filter).await?)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
