//! Analytics relay route for front-end tracking events.

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::analytics::{AnalyticsEvent, TrackRequest};
use crate::errors::AppError;
use crate::AppState;

/// POST /api/analytics/track — validate and forward a tracking event.
pub async fn track(
    State(state): State<AppState>,
    Json(body): Json<TrackRequest>,
) -> Result<StatusCode, AppError> {
    body.validate()?;
    state.analytics.track_detached(AnalyticsEvent::from(body));
    Ok(StatusCode::ACCEPTED)
}
