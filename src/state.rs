use std::sync::Arc;

use crate::auth::{TokenError, TokenIssuer};
use crate::config::AppConfig;
use crate::database::DocumentStore;
use crate::services::{CustomerService, NeedService, UserService};

/// Shared per-process handles injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub issuer: TokenIssuer,
    pub users: UserService,
    pub needs: NeedService,
    pub customers: CustomerService,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Result<Self, TokenError> {
        let issuer = TokenIssuer::from_config(&config.security)?;
        let indices = &config.store.indices;

        Ok(Self {
            users: UserService::new(store.clone(), indices.users.clone()),
            needs: NeedService::new(store.clone(), indices.needs.clone()),
            customers: CustomerService::new(store.clone(), indices.customers.clone()),
            issuer,
            store,
            config: Arc::new(config),
        })
    }
}
