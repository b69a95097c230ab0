//! Route definitions for the budget dashboard API.

pub mod analytics;
pub mod budget;
pub mod contact_stats;
pub mod health;

use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::errors::AppError;
use crate::AppState;

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let cors = match HeaderValue::from_str(&state.config.frontend_url) {
        Ok(origin) => CorsLayer::new().allow_origin(origin),
        Err(e) => {
            tracing::warn!(error = %e, "Invalid FRONTEND_URL, allowing any origin");
            CorsLayer::new().allow_origin(Any)
        }
    }
    .allow_methods([Method::GET, Method::POST])
    .allow_headers(Any);

    let api = Router::new()
        .route("/contact-stats", get(contact_stats::stats))
        .route("/budget/spending", get(budget::spending))
        .route("/budget/spending/recalculate", post(budget::recalculate))
        .route(
            "/budget/spending/export",
            get(budget::export_baseline).post(budget::export_adjusted),
        )
        .route("/budget/tax-brackets", get(budget::tax_brackets))
        .route("/budget/tax/estimate", get(budget::tax_estimate))
        .route("/budget/bills", get(budget::bills))
        .route("/budget/military", get(budget::military))
        .route("/analytics/track", post(analytics::track));

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api", api)
        .fallback(not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
