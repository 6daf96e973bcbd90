pub mod user;
pub mod need;
pub mod customer;
pub mod contact;
pub mod need_content;

pub use contact::CustomerContact;
pub use customer::Customer;
pub use need::{Need, NeedStatus};
pub use need_content::NeedContent;
pub use user::{User, UserRole};

use serde_json::Value;
use thiserror::Error;

use super::store::Hit;

/// Stored document field names
pub mod fields {
    pub const KIND: &str = "Kind";
    pub const EMAIL: &str = "Email";
    pub const NAME: &str = "Name";
    pub const ROLE: &str = "Role";
    pub const PASSWORD_HASH: &str = "PasswordHash";
    pub const AUTHOR: &str = "Author";
    pub const TITLE: &str = "Title";
    pub const CREATED_AT: &str = "CreatedAt";
    pub const START_AT_LATEST: &str = "StartAtLatest";
    pub const CUSTOMER: &str = "Customer";
    pub const CONTACT: &str = "Contact";
    pub const DESCRIPTION: &str = "Description";
    pub const SUCCESS_KEYS: &str = "SuccessKeys";
    pub const MONTH_DURATION: &str = "MonthDuration";
    pub const WEEK_FREQUENCY: &str = "WeekFrequency";
    pub const RATE: &str = "Rate";
    pub const CONSULTANTS: &str = "Consultants";
    pub const STATUS: &str = "Status";
    pub const NEED: &str = "Need";
    pub const FILENAME: &str = "Filename";
}

/// Default for absent numeric attributes
pub const MISSING_NUMBER: f64 = -1.0;

#[derive(Debug, Error, PartialEq)]
pub enum MappingError {
    #[error("Document {id} is missing required field {field}")]
    MissingField { id: String, field: &'static str },

    #[error("Document {id} has an invalid {field}: {reason}")]
    InvalidField {
        id: String,
        field: &'static str,
        reason: String,
    },
}

/// Typed record built from a raw search hit.
///
/// `KIND` is the discriminator stored alongside the record so that several
/// record types can share one index.
pub trait FromHit: Sized {
    const KIND: &'static str;

    fn from_hit(hit: &Hit) -> Result<Self, MappingError>;
}

pub(crate) fn required_str(hit: &Hit, field: &'static str) -> Result<String, MappingError> {
    match hit.source.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        None | Some(Value::Null) => Err(MappingError::MissingField { id: hit.id.clone(), field }),
        Some(other) => Err(invalid(hit, field, format!("expected text, found {}", other))),
    }
}

pub(crate) fn optional_str(hit: &Hit, field: &'static str) -> Result<Option<String>, MappingError> {
    match hit.source.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(invalid(hit, field, format!("expected text, found {}", other))),
    }
}

pub(crate) fn str_or_empty(hit: &Hit, field: &'static str) -> Result<String, MappingError> {
    Ok(optional_str(hit, field)?.unwrap_or_default())
}

pub(crate) fn number_or_missing(hit: &Hit, field: &'static str) -> Result<f64, MappingError> {
    match hit.source.get(field) {
        None | Some(Value::Null) => Ok(MISSING_NUMBER),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| invalid(hit, field, format!("{} is not representable", n))),
        // numeric fields indexed from form posts may arrive as text
        Some(Value::String(s)) => s
            .parse::<f64>()
            .map_err(|e| invalid(hit, field, e.to_string())),
        Some(other) => Err(invalid(hit, field, format!("expected number, found {}", other))),
    }
}

/// Flatten `[{key: "a"}, {key: "b"}]` into `["a", "b"]`; absent is empty
pub(crate) fn nested_list(hit: &Hit, field: &'static str, key: &str) -> Result<Vec<String>, MappingError> {
    let items = match hit.source.get(field) {
        None | Some(Value::Null) => return Ok(vec![]),
        Some(Value::Array(items)) => items,
        Some(other) => return Err(invalid(hit, field, format!("expected list, found {}", other))),
    };

    items
        .iter()
        .map(|item| match item.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(invalid(hit, field, format!("entry without text '{}': {}", key, item))),
        })
        .collect()
}

fn invalid(hit: &Hit, field: &'static str, reason: String) -> MappingError {
    MappingError::InvalidField {
        id: hit.id.clone(),
        field,
        reason,
    }
}
