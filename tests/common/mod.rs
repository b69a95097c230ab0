//! Shared helpers for router-level tests: a recording contacts store and
//! request/response plumbing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use chrono::{Duration, Utc};
use serde_json::Value;
use tower::ServiceExt;

use budget_dashboard::config::AppConfig;
use budget_dashboard::models::budget::BudgetDataset;
use budget_dashboard::models::contact::{Chamber, ContactMemberRow};
use budget_dashboard::store::{ContactStore, ContactWindow, StoreError};
use budget_dashboard::{routes, AppState};

/// Counts the spy reports for each trailing window.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpyCounts {
    pub total: Option<i64>,
    pub last_24_hours: Option<i64>,
    pub this_week: Option<i64>,
    pub prior_week: Option<i64>,
}

/// In-memory contacts store that records every query it receives.
#[derive(Debug, Default)]
pub struct SpyStore {
    pub counts: SpyCounts,
    pub rows: Vec<ContactMemberRow>,
    pub fail_join: bool,
    calls: AtomicUsize,
}

impl SpyStore {
    pub fn new(counts: SpyCounts, rows: Vec<ContactMemberRow>) -> Self {
        Self {
            counts,
            rows,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_join: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContactStore for SpyStore {
    async fn count_contacts(&self, window: ContactWindow) -> Result<Option<i64>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let count = match (window.since, window.until) {
            (None, None) => self.counts.total,
            (Some(_), Some(_)) => self.counts.prior_week,
            (Some(since), None) if Utc::now() - since < Duration::days(2) => {
                self.counts.last_24_hours
            }
            (Some(_), None) => self.counts.this_week,
            (None, Some(_)) => None,
        };
        Ok(count)
    }

    async fn list_contact_members(&self) -> Result<Vec<ContactMemberRow>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_join {
            return Err(StoreError::Status {
                status: 503,
                message: "upstream unavailable".to_string(),
            });
        }
        Ok(self.rows.clone())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

pub fn house(state: &str, district: &str) -> ContactMemberRow {
    ContactMemberRow {
        zip_code: "00000".to_string(),
        state: state.to_string(),
        district: Some(district.to_string()),
        chamber: Chamber::House,
    }
}

pub fn senate(state: &str, district: Option<&str>) -> ContactMemberRow {
    ContactMemberRow {
        zip_code: "00000".to_string(),
        state: state.to_string(),
        district: district.map(str::to_string),
        chamber: Chamber::Senate,
    }
}

/// Configuration built from explicit pairs instead of the process environment.
pub fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    AppConfig::from_lookup(|key| vars.get(key).cloned()).expect("config")
}

pub fn configured() -> AppConfig {
    config_from(&[
        ("SUPABASE_URL", "https://contacts.example.co"),
        ("SUPABASE_SERVICE_ROLE_KEY", "service-role-key"),
    ])
}

/// State whose contacts store, if configured, is `spy`.
pub fn state_with(config: AppConfig, spy: Arc<SpyStore>) -> AppState {
    let dataset = BudgetDataset::embedded().expect("embedded dataset");
    AppState::build(config, dataset, move |_| Ok(spy as Arc<dyn ContactStore>)).expect("state")
}

pub async fn send(state: AppState, request: Request<Body>) -> Response<Body> {
    routes::router(state)
        .oneshot(request)
        .await
        .expect("router is infallible")
}

pub async fn get(state: AppState, uri: &str) -> Response<Body> {
    send(state, Request::get(uri).body(Body::empty()).expect("request")).await
}

pub async fn post_json(state: AppState, uri: &str, body: Value) -> Response<Body> {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");
    send(state, request).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body")
        .to_vec()
}

pub async fn json_body(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = body_bytes(response).await;
    let value = serde_json::from_slice(&bytes).expect("json body");
    (status, value)
}
