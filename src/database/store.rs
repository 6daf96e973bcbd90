use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::filter::Filter;

/// Errors from the document store transport
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),

    #[error("Store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected store response: {0}")]
    Decode(String),
}

/// A raw search hit: store-assigned id plus the stored document
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub id: String,
    pub source: Map<String, Value>,
}

impl Hit {
    pub fn new(id: impl Into<String>, source: Map<String, Value>) -> Self {
        Self { id: id.into(), source }
    }
}

/// Outcome reported by the store for a single-document write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteResult {
    Created,
    Updated,
    Deleted,
    NotFound,
    Noop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub id: String,
    pub result: WriteResult,
}

/// Operations the repositories need from a search engine cluster.
///
/// Implementations are stateless per call and shared behind an `Arc` by every
/// in-flight request.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Run the filter against its index; a missing index yields no hits
    async fn search(&self, filter: &Filter) -> Result<Vec<Hit>, StoreError>;

    /// Index a new document under a store-assigned id
    async fn index(&self, index: &str, document: Map<String, Value>) -> Result<WriteOutcome, StoreError>;

    /// Merge `partial` into the existing document
    async fn update(&self, index: &str, id: &str, partial: Map<String, Value>) -> Result<WriteOutcome, StoreError>;

    /// Remove every document matching the filter, returning the deleted count
    async fn delete_by_query(&self, filter: &Filter) -> Result<u64, StoreError>;

    /// Make recent writes visible to search
    async fn refresh(&self, index: &str) -> Result<(), StoreError>;

    async fn index_exists(&self, index: &str) -> Result<bool, StoreError>;

    async fn create_index(&self, index: &str, settings: Value) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
