//! Health check endpoints for liveness and readiness probes.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

/// Readiness probe detail.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub contacts_store: String,
}

/// Liveness probe — always returns OK if the process is running.
pub async fn live() -> &'static str {
    "OK"
}

/// Readiness probe — checks contacts store connectivity.
pub async fn ready(State(state): State<AppState>) -> Json<HealthStatus> {
    let contacts_status = match state.contacts() {
        None => "not_configured".to_string(),
        Some(store) => match store.ping().await {
            Ok(()) => "connected".to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Contacts store health check failed");
                format!("error: {e}")
            }
        },
    };

    Json(HealthStatus {
        status: "ok".to_string(),
        contacts_store: contacts_status,
    })
}
