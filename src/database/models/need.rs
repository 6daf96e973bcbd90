use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{fields, nested_list, number_or_missing, required_str, str_or_empty, FromHit, MappingError};
use crate::database::store::Hit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeedStatus {
    Open,
    Win,
    Lost,
}

impl NeedStatus {
    pub const ALL: [NeedStatus; 3] = [NeedStatus::Open, NeedStatus::Win, NeedStatus::Lost];

    pub fn as_str(&self) -> &'static str {
        match self {
            NeedStatus::Open => "open",
            NeedStatus::Win => "win",
            NeedStatus::Lost => "lost",
        }
    }
}

impl FromStr for NeedStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NeedStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("'{}' is not one of open, win, lost", s))
    }
}

impl fmt::Display for NeedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sales opportunity owned by its author.
///
/// Absent optional attributes are mapped to `""`, `-1` or an empty list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Need {
    pub id: String,
    pub author: String,
    pub title: String,
    pub created_at: String,
    pub start_at_latest: String,
    pub customer: String,
    pub contact: String,
    pub description: String,
    pub success_keys: Vec<String>,
    pub month_duration: f64,
    pub week_frequency: f64,
    pub rate: f64,
    pub consultants: Vec<String>,
    pub status: NeedStatus,
}

impl FromHit for Need {
    const KIND: &'static str = "need";

    fn from_hit(hit: &Hit) -> Result<Self, MappingError> {
        let status = required_str(hit, fields::STATUS)?;
        let status = status.parse().map_err(|reason| MappingError::InvalidField {
            id: hit.id.clone(),
            field: fields::STATUS,
            reason,
        })?;

        Ok(Self {
            id: hit.id.clone(),
            author: required_str(hit, fields::AUTHOR)?,
            title: required_str(hit, fields::TITLE)?,
            created_at: required_str(hit, fields::CREATED_AT)?,
            start_at_latest: str_or_empty(hit, fields::START_AT_LATEST)?,
            customer: required_str(hit, fields::CUSTOMER)?,
            contact: required_str(hit, fields::CONTACT)?,
            description: str_or_empty(hit, fields::DESCRIPTION)?,
            success_keys: nested_list(hit, fields::SUCCESS_KEYS, "key")?,
            month_duration: number_or_missing(hit, fields::MONTH_DURATION)?,
            week_frequency: number_or_missing(hit, fields::WEEK_FREQUENCY)?,
            rate: number_or_missing(hit, fields::RATE)?,
            consultants: nested_list(hit, fields::CONSULTANTS, "id")?,
            status,
        })
    }
}
