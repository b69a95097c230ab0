pub mod analytics;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use std::sync::Arc;

use config::{AppConfig, ContactStoreConfig};
use models::budget::BudgetDataset;
use store::{ContactStore, StoreError};

/// Shared application state passed to all Axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    /// `None` when store credentials are missing; stats requests then fail
    /// with a configuration error without touching the network.
    pub contacts: Option<Arc<dyn ContactStore>>,
    pub budget: Arc<BudgetDataset>,
    pub analytics: analytics::Tracker,
}

impl AppState {
    /// Assemble state, invoking `open_store` only when the store is configured.
    pub fn build<F>(config: AppConfig, budget: BudgetDataset, open_store: F) -> Result<Self, StoreError>
    where
        F: FnOnce(&ContactStoreConfig) -> Result<Arc<dyn ContactStore>, StoreError>,
    {
        let contacts = match &config.contacts_store {
            Some(store_config) => Some(open_store(store_config)?),
            None => {
                tracing::warn!("Contacts store credentials missing; contact stats will be unavailable");
                None
            }
        };
        let analytics = analytics::Tracker::new(config.analytics.as_ref());

        Ok(Self {
            config,
            contacts,
            budget: Arc::new(budget),
            analytics,
        })
    }

    pub fn contacts(&self) -> Option<&dyn ContactStore> {
        self.contacts.as_deref()
    }
}
