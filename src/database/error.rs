use thiserror::Error;

use super::models::MappingError;
use super::store::StoreError;
use crate::filter::FilterError;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error("Query error: {0}")]
    QueryError(#[from] FilterError),
}
