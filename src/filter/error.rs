use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid index name: {0}")]
    InvalidIndexName(String),

    #[error("Invalid field name: {0}")]
    InvalidField(String),

    #[error("Invalid filter value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
