use serde::Serialize;

use crate::database::models::{Customer, CustomerContact, Need, NeedContent, NeedStatus, User};

// Wire shapes returned by the API. Stored records are never serialized
// directly so password hashes cannot leak.

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerMinimal {
    pub id: String,
    pub name: String,
}

impl From<&Customer> for CustomerMinimal {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id.clone(),
            name: customer.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactMinimal {
    pub id: String,
    pub name: String,
}

impl From<&CustomerContact> for ContactMinimal {
    fn from(contact: &CustomerContact) -> Self {
        Self {
            id: contact.id.clone(),
            name: contact.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsultantMinimal {
    pub id: String,
    pub name: String,
}

impl From<&User> for ConsultantMinimal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NeedMinimal {
    pub id: String,
    pub created_at: String,
    pub customer: String,
    pub customer_obj: Option<CustomerMinimal>,
    pub contact: String,
    pub contact_obj: Option<ContactMinimal>,
    pub title: String,
    pub start_at_latest: String,
    pub status: NeedStatus,
}

impl NeedMinimal {
    pub fn new(need: &Need, customer: Option<&Customer>, contact: Option<&CustomerContact>) -> Self {
        Self {
            id: need.id.clone(),
            created_at: need.created_at.clone(),
            customer: need.customer.clone(),
            customer_obj: customer.map(CustomerMinimal::from),
            contact: need.contact.clone(),
            contact_obj: contact.map(ContactMinimal::from),
            title: need.title.clone(),
            start_at_latest: need.start_at_latest.clone(),
            status: need.status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NeedComplete {
    #[serde(flatten)]
    pub minimal: NeedMinimal,
    pub month_duration: f64,
    pub week_frequency: f64,
    pub rate: f64,
    pub consultants: Vec<String>,
    pub consultants_obj: Vec<ConsultantMinimal>,
    pub description: String,
    pub success_keys: Vec<String>,
}

impl NeedComplete {
    pub fn new(need: &Need, minimal: NeedMinimal, consultants: &[User]) -> Self {
        Self {
            minimal,
            month_duration: need.month_duration,
            week_frequency: need.week_frequency,
            rate: need.rate,
            consultants: need.consultants.clone(),
            consultants_obj: consultants.iter().map(ConsultantMinimal::from).collect(),
            description: need.description.clone(),
            success_keys: need.success_keys.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeedContentView {
    pub id: String,
    pub need: String,
    pub filename: String,
}

impl From<&NeedContent> for NeedContentView {
    fn from(content: &NeedContent) -> Self {
        Self {
            id: content.id.clone(),
            need: content.need.clone(),
            filename: content.filename.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NeedList {
    pub needs: Vec<NeedMinimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerList {
    pub customers: Vec<CustomerMinimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactList {
    pub contacts: Vec<ContactMinimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsultantList {
    pub consultants: Vec<ConsultantMinimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenView {
    pub token: String,
    pub expires_in: u64,
}
