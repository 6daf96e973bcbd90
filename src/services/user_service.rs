use serde_json::{Map, Value};
use std::sync::Arc;

use super::{insert_text, AUTOCOMPLETE_SIZE};
use crate::database::models::{fields, User, UserRole};
use crate::database::{DatabaseError, DocumentStore, Repository};

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub password_hash: Option<String>,
}

/// Users and consultants (users whose role is `consultant`)
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn DocumentStore>,
    users: Repository<User>,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>, index: impl Into<String>) -> Self {
        let users = Repository::new(index, store.clone());
        Self { store, users }
    }

    pub fn with_index(&self, index: impl Into<String>) -> Self {
        Self::new(self.store.clone(), index)
    }

    pub fn index(&self) -> &str {
        self.users.index()
    }

    /// Look up a login. The phrase query narrows candidates, the final
    /// comparison is exact so `jane@x.io` never resolves `mary.jane@x.io`.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        if email.is_empty() {
            return Ok(None);
        }
        let query = self
            .users
            .query()?
            .match_phrase(fields::EMAIL, email)?
            .window(0, AUTOCOMPLETE_SIZE);
        let candidates = self.users.select_any(query).await?;
        Ok(candidates
            .into_iter()
            .find(|user| user.email.eq_ignore_ascii_case(email)))
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>, DatabaseError> {
        self.users.select_id(id).await
    }

    pub async fn get_consultant_by_id(&self, id: &str) -> Result<Option<User>, DatabaseError> {
        let query = self
            .users
            .query()?
            .id(id)?
            .term(fields::ROLE, UserRole::Consultant.as_str())?;
        self.users.select_one(query).await
    }

    pub async fn get_possible_consultants(&self, prefix: &str) -> Result<Vec<User>, DatabaseError> {
        if prefix.is_empty() {
            return Ok(vec![]);
        }
        let query = self
            .users
            .query()?
            .matches(fields::NAME, prefix)?
            .term(fields::ROLE, UserRole::Consultant.as_str())?
            .window(0, AUTOCOMPLETE_SIZE);
        self.users.select_any(query).await
    }

    pub async fn create_user(&self, user: NewUser) -> Result<Option<User>, DatabaseError> {
        let mut document = Map::new();
        document.insert(fields::EMAIL.to_string(), Value::String(user.email));
        document.insert(fields::NAME.to_string(), Value::String(user.name));
        document.insert(fields::ROLE.to_string(), Value::String(user.role.as_str().to_string()));
        insert_text(&mut document, fields::PASSWORD_HASH, user.password_hash.as_deref());
        self.users.create(document).await
    }
}
