use serde::Serialize;

use super::{fields, required_str, FromHit, MappingError};
use crate::database::store::Hit;

/// Attachment record; the bytes live in the upload folder under `filename`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeedContent {
    pub id: String,
    pub need: String,
    pub filename: String,
}

impl FromHit for NeedContent {
    const KIND: &'static str = "content";

    fn from_hit(hit: &Hit) -> Result<Self, MappingError> {
        Ok(Self {
            id: hit.id.clone(),
            need: required_str(hit, fields::NEED)?,
            filename: required_str(hit, fields::FILENAME)?,
        })
    }
}
