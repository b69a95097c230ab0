//! Analytics tracking client.
//!
//! Events are POSTed as JSON to a configured collection endpoint. Tracking is
//! best-effort: delivery failures are logged and never reach the caller, and
//! with no endpoint configured every call is a no-op.

use std::sync::LazyLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::config::AnalyticsConfig;

static EVENT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]{0,63}$").expect("valid event name pattern"));

fn validate_event_name(name: &str) -> Result<(), ValidationError> {
    if EVENT_NAME.is_match(name) {
        Ok(())
    } else {
        Err(ValidationError::new("event_name")
            .with_message("event must be snake_case, start with a letter, max 64 chars".into()))
    }
}

/// Event submitted by the dashboard front end.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TrackRequest {
    #[validate(custom(function = "validate_event_name"))]
    pub event: String,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// Wire payload delivered to the analytics endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub message_id: Uuid,
    pub event: String,
    pub properties: serde_json::Map<String, serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl AnalyticsEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            event: event.into(),
            properties: serde_json::Map::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_property(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }
}

impl From<TrackRequest> for AnalyticsEvent {
    fn from(request: TrackRequest) -> Self {
        Self {
            properties: request.properties,
            ..Self::new(request.event)
        }
    }
}

/// Delivery failure, only ever observed through [`Tracker::send`].
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Analytics endpoint returned {0}")]
    Status(u16),
}

#[derive(Debug, Clone)]
struct Sink {
    endpoint: String,
    write_key: Option<String>,
}

/// Cheaply cloneable tracking client.
#[derive(Debug, Clone)]
pub struct Tracker {
    client: reqwest::Client,
    sink: Option<Sink>,
}

impl Tracker {
    /// Tracker that drops every event.
    pub fn disabled() -> Self {
        Self {
            client: reqwest::Client::new(),
            sink: None,
        }
    }

    pub fn new(config: Option<&AnalyticsConfig>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();
        Self {
            client,
            sink: config.map(|c| Sink {
                endpoint: c.endpoint.clone(),
                write_key: c.write_key.clone(),
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Deliver one event, reporting failures to the caller.
    pub async fn send(&self, event: &AnalyticsEvent) -> Result<(), TrackError> {
        let Some(sink) = &self.sink else {
            return Ok(());
        };

        let mut request = self.client.post(&sink.endpoint).json(event);
        if let Some(key) = &sink.write_key {
            request = request.bearer_auth(key);
        }

        let status = request.send().await?.status();
        if !status.is_success() {
            return Err(TrackError::Status(status.as_u16()));
        }
        Ok(())
    }

    /// Deliver one event, logging and discarding any failure.
    pub async fn track(&self, event: AnalyticsEvent) {
        if !self.is_enabled() {
            tracing::debug!(event = %event.event, "Analytics disabled, dropping event");
            return;
        }
        if let Err(e) = self.send(&event).await {
            tracing::warn!(error = %e, event = %event.event, "Analytics delivery failed");
        }
    }

    /// Deliver an event on a background task so the request path never waits.
    pub fn track_detached(&self, event: AnalyticsEvent) {
        if !self.is_enabled() {
            return;
        }
        let tracker = self.clone();
        tokio::spawn(async move { tracker.track(event).await });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(event: &str) -> TrackRequest {
        TrackRequest {
            event: event.to_string(),
            properties: serde_json::Map::new(),
        }
    }

    #[test]
    fn accepts_snake_case_event_names() {
        assert!(request("page_view").validate().is_ok());
        assert!(request("slider_moved_2").validate().is_ok());
    }

    #[test]
    fn rejects_malformed_event_names() {
        let too_long = "a".repeat(65);
        for name in ["", "PageView", "2fast", "page-view", too_long.as_str()] {
            assert!(request(name).validate().is_err(), "{name:?} should be rejected");
        }
    }

    #[test]
    fn event_serializes_camel_case() {
        let event = AnalyticsEvent::new("spending_exported").with_property("fiscalYear", 2024);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "spending_exported");
        assert_eq!(json["properties"]["fiscalYear"], 2024);
        assert!(json["messageId"].is_string());
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn request_properties_carry_over() {
        let mut properties = serde_json::Map::new();
        properties.insert("tab".to_string(), "taxes".into());
        let event = AnalyticsEvent::from(TrackRequest {
            event: "tab_selected".to_string(),
            properties,
        });
        assert_eq!(event.event, "tab_selected");
        assert_eq!(event.properties["tab"], "taxes");
    }

    #[tokio::test]
    async fn disabled_tracker_sends_nothing() {
        let tracker = Tracker::disabled();
        assert!(!tracker.is_enabled());
        assert!(tracker.send(&AnalyticsEvent::new("noop")).await.is_ok());
    }
}
