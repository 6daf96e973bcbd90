pub mod elastic;
pub mod error;
pub mod memory;
pub mod models;
pub mod query_builder;
pub mod repository;
pub mod store;

pub use elastic::ElasticsearchStore;
pub use error::DatabaseError;
pub use memory::MemoryStore;
pub use query_builder::QueryBuilder;
pub use repository::Repository;
pub use store::{DocumentStore, Hit, StoreError, WriteOutcome, WriteResult};
