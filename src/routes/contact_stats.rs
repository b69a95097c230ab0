//! Contact statistics route.

use axum::{extract::State, Json};
use chrono::Utc;

use crate::errors::AppError;
use crate::services::contact_stats::{self, ContactStats};
use crate::AppState;

/// GET /api/contact-stats — contact volume, top districts and weekly growth.
pub async fn stats(State(state): State<AppState>) -> Result<Json<ContactStats>, AppError> {
    let stats = contact_stats::get_contact_stats(state.contacts(), Utc::now()).await?;
    Ok(Json(stats))
}
