use serde_json::{Map, Value};
use std::sync::Arc;

use super::AUTOCOMPLETE_SIZE;
use crate::database::models::{fields, Customer, CustomerContact};
use crate::database::{DatabaseError, DocumentStore, Repository};

#[derive(Debug, Clone)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub customer: String,
}

/// Customers and their contacts, which share the customers index
#[derive(Clone)]
pub struct CustomerService {
    store: Arc<dyn DocumentStore>,
    customers: Repository<Customer>,
    contacts: Repository<CustomerContact>,
}

impl CustomerService {
    pub fn new(store: Arc<dyn DocumentStore>, index: impl Into<String>) -> Self {
        let index = index.into();
        Self {
            customers: Repository::new(index.clone(), store.clone()),
            contacts: Repository::new(index, store.clone()),
            store,
        }
    }

    pub fn with_index(&self, index: impl Into<String>) -> Self {
        Self::new(self.store.clone(), index)
    }

    pub fn index(&self) -> &str {
        self.customers.index()
    }

    pub async fn get_customer_by_id(&self, id: &str) -> Result<Option<Customer>, DatabaseError> {
        self.customers.select_id(id).await
    }

    /// Exact (case-insensitive) name lookup
    pub async fn get_customer_by_name(&self, name: &str) -> Result<Option<Customer>, DatabaseError> {
        if name.is_empty() {
            return Ok(None);
        }
        let query = self
            .customers
            .query()?
            .match_phrase(fields::NAME, name)?
            .window(0, AUTOCOMPLETE_SIZE);
        let candidates = self.customers.select_any(query).await?;
        Ok(candidates
            .into_iter()
            .find(|customer| customer.name.to_lowercase() == name.to_lowercase()))
    }

    pub async fn get_possible_customers(&self, prefix: &str) -> Result<Vec<Customer>, DatabaseError> {
        if prefix.is_empty() {
            return Ok(vec![]);
        }
        let query = self
            .customers
            .query()?
            .matches(fields::NAME, prefix)?
            .window(0, AUTOCOMPLETE_SIZE);
        self.customers.select_any(query).await
    }

    pub async fn create_customer(&self, name: &str) -> Result<Option<Customer>, DatabaseError> {
        let mut document = Map::new();
        document.insert(fields::NAME.to_string(), Value::String(name.to_string()));
        self.customers.create(document).await
    }

    pub async fn get_contact_by_id(&self, id: &str) -> Result<Option<CustomerContact>, DatabaseError> {
        self.contacts.select_id(id).await
    }

    pub async fn get_possible_contacts(
        &self,
        prefix: &str,
        customer: Option<&str>,
    ) -> Result<Vec<CustomerContact>, DatabaseError> {
        if prefix.is_empty() {
            return Ok(vec![]);
        }
        let query = self
            .contacts
            .query()?
            .matches(fields::NAME, prefix)?
            .term_opt(fields::CUSTOMER, customer)?
            .window(0, AUTOCOMPLETE_SIZE);
        self.contacts.select_any(query).await
    }

    pub async fn create_contact(&self, contact: &NewContact) -> Result<Option<CustomerContact>, DatabaseError> {
        let mut document = Map::new();
        document.insert(fields::NAME.to_string(), Value::String(contact.name.clone()));
        document.insert(fields::EMAIL.to_string(), Value::String(contact.email.clone()));
        document.insert(fields::CUSTOMER.to_string(), Value::String(contact.customer.clone()));
        self.contacts.create(document).await
    }
}
