//! Read-only access to the contacts store.
//!
//! The aggregator only needs exact counting over a `contacted_at` window and
//! the contact+member join. [`ContactStore`] captures that surface so the
//! hosted table API and a direct PostgreSQL connection are interchangeable,
//! and so tests can substitute an in-memory store.

pub mod postgres;
pub mod rest;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::ContactStoreConfig;
use crate::models::contact::{ContactMemberRow, RowError};

pub use postgres::PgContactStore;
pub use rest::RestContactStore;

/// Errors raised by a contacts store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),

    #[error("Store returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Malformed join row: {0}")]
    Row(#[from] RowError),
}

/// Half-open `[since, until)` range on `contacted_at`. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactWindow {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl ContactWindow {
    /// No filter: every contact.
    pub fn all() -> Self {
        Self::default()
    }

    /// Contacts at or after `since`.
    pub fn since(since: DateTime<Utc>) -> Self {
        Self {
            since: Some(since),
            until: None,
        }
    }

    /// Contacts at or after `since` and strictly before `until`.
    pub fn between(since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        Self {
            since: Some(since),
            until: Some(until),
        }
    }
}

/// Query surface consumed by the contact statistics aggregator.
#[async_trait]
pub trait ContactStore: Send + Sync + std::fmt::Debug {
    /// Exact number of contacts inside `window`. `None` when the store reports no count.
    async fn count_contacts(&self, window: ContactWindow) -> Result<Option<i64>, StoreError>;

    /// Every contact joined with its member, validated.
    async fn list_contact_members(&self) -> Result<Vec<ContactMemberRow>, StoreError>;

    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Open the backend selected by configuration.
pub fn open(config: &ContactStoreConfig) -> Result<Arc<dyn ContactStore>, StoreError> {
    match config {
        ContactStoreConfig::Rest {
            url,
            service_key,
            timeout_secs,
        } => {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(*timeout_secs))
                .build()?;
            Ok(Arc::new(RestContactStore::with_client(
                client,
                url.as_str(),
                service_key.as_str(),
            )))
        }
        ContactStoreConfig::Postgres {
            database_url,
            max_connections,
            timeout_secs,
        } => {
            let pool = crate::db::create_pool(
                database_url,
                *max_connections,
                Duration::from_secs(*timeout_secs),
            )?;
            Ok(Arc::new(PgContactStore::new(pool)))
        }
    }
}
