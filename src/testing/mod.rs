use std::sync::Arc;

use crate::config::IndexNames;
use crate::database::models::{CustomerContact, Need, NeedStatus, User, UserRole};
use crate::database::{DocumentStore, MemoryStore};
use crate::services::{CustomerService, NeedService, NewContact, NewNeed, NewUser, UserService};

/// Services wired to a fresh in-memory store
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub users: UserService,
    pub needs: NeedService,
    pub customers: CustomerService,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let shared: Arc<dyn DocumentStore> = store.clone();
        let indices = IndexNames::default();
        Self {
            users: UserService::new(shared.clone(), indices.users),
            needs: NeedService::new(shared.clone(), indices.needs),
            customers: CustomerService::new(shared, indices.customers),
            store,
        }
    }

    pub async fn create_user(&self, email: &str, name: &str, role: UserRole) -> User {
        self.users
            .create_user(NewUser {
                email: email.to_string(),
                name: name.to_string(),
                role,
                password_hash: None,
            })
            .await
            .expect("store error")
            .expect("user not created")
    }

    pub async fn create_contact(&self, customer: &str, name: &str) -> CustomerContact {
        let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
        self.customers
            .create_contact(&NewContact {
                name: name.to_string(),
                email,
                customer: customer.to_string(),
            })
            .await
            .expect("store error")
            .expect("contact not created")
    }

    pub async fn create_need(&self, author: &str, title: &str, status: NeedStatus) -> Need {
        let need = NewNeed {
            author: author.to_string(),
            title: title.to_string(),
            created_at: "2017-03-01T10:00:00".to_string(),
            start_at_latest: None,
            customer: "c1".to_string(),
            contact: "k1".to_string(),
            description: None,
            success_keys: vec![],
            month_duration: None,
            week_frequency: None,
            rate: None,
            consultants: vec![],
            status,
        };
        self.needs
            .create_need(&need)
            .await
            .expect("store error")
            .expect("need not created")
    }
}
