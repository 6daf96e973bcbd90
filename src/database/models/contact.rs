use serde::Serialize;

use super::{fields, required_str, str_or_empty, FromHit, MappingError};
use crate::database::store::Hit;

/// A person at a customer. Stored in the customers index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerContact {
    pub id: String,
    pub name: String,
    pub email: String,
    pub customer: String,
}

impl FromHit for CustomerContact {
    const KIND: &'static str = "contact";

    fn from_hit(hit: &Hit) -> Result<Self, MappingError> {
        Ok(Self {
            id: hit.id.clone(),
            name: required_str(hit, fields::NAME)?,
            email: required_str(hit, fields::EMAIL)?,
            customer: str_or_empty(hit, fields::CUSTOMER)?,
        })
    }
}
