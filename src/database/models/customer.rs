use serde::Serialize;

use super::{fields, required_str, FromHit, MappingError};
use crate::database::store::Hit;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
}

impl FromHit for Customer {
    const KIND: &'static str = "customer";

    fn from_hit(hit: &Hit) -> Result<Self, MappingError> {
        Ok(Self {
            id: hit.id.clone(),
            name: required_str(hit, fields::NAME)?,
        })
    }
}
