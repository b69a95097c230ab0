//! Router-level tests for `GET /api/contact-stats` against a recording store.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use common::{configured, config_from, get, house, json_body, senate, state_with, SpyCounts, SpyStore};

#[tokio::test]
async fn empty_store_reports_zeroes() {
    let spy = Arc::new(SpyStore::new(
        SpyCounts {
            total: Some(0),
            last_24_hours: Some(0),
            this_week: Some(0),
            prior_week: Some(0),
        },
        vec![],
    ));
    let state = state_with(configured(), spy.clone());

    let (status, body) = json_body(get(state, "/api/contact-stats").await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "totalContacts": 0,
            "last24Hours": 0,
            "topDistricts": [],
            "growthRate": 0.0
        })
    );
    // Four counts and one join.
    assert_eq!(spy.calls(), 5);
}

#[tokio::test]
async fn groups_house_rows_by_district() {
    let mut rows = vec![house("CA", "12"); 3];
    rows.extend(vec![house("CA", "12"); 2]);
    rows.push(house("TX", "5"));
    let spy = Arc::new(SpyStore::new(
        SpyCounts {
            total: Some(6),
            last_24_hours: Some(2),
            this_week: Some(6),
            prior_week: Some(0),
        },
        rows,
    ));

    let (status, body) = json_body(get(state_with(configured(), spy), "/api/contact-stats").await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalContacts"], 6);
    assert_eq!(body["last24Hours"], 2);
    assert_eq!(
        body["topDistricts"],
        json!([
            {"district": "CA-12", "count": 5},
            {"district": "TX-5", "count": 1}
        ])
    );
    assert_eq!(body["growthRate"], 0.0);
}

#[tokio::test]
async fn senate_rows_are_keyed_by_state() {
    let spy = Arc::new(SpyStore::new(
        SpyCounts::default(),
        vec![senate("NY", Some("14")), senate("NY", None)],
    ));

    let (_, body) = json_body(get(state_with(configured(), spy), "/api/contact-stats").await).await;

    assert_eq!(body["topDistricts"], json!([{"district": "NY (Senate)", "count": 2}]));
}

#[tokio::test]
async fn top_districts_are_capped_and_sorted() {
    let mut rows = Vec::new();
    for (district, n) in [("1", 2), ("2", 7), ("3", 1), ("4", 4), ("5", 9), ("6", 3), ("7", 6)] {
        rows.extend(vec![house("OH", district); n]);
    }
    let total_rows = rows.len();
    let spy = Arc::new(SpyStore::new(SpyCounts::default(), rows));

    let (_, body) = json_body(get(state_with(configured(), spy), "/api/contact-stats").await).await;

    let top = body["topDistricts"].as_array().unwrap();
    assert_eq!(top.len(), 5);
    let counts: Vec<i64> = top.iter().map(|d| d["count"].as_i64().unwrap()).collect();
    assert_eq!(counts, vec![9, 7, 6, 4, 3]);
    assert!(counts.iter().sum::<i64>() <= total_rows as i64);
}

#[tokio::test]
async fn growth_rate_compares_trailing_weeks() {
    for (this_week, prior_week, expected) in [(150, 100, 50.0), (80, 100, -20.0), (42, 0, 0.0)] {
        let spy = Arc::new(SpyStore::new(
            SpyCounts {
                total: Some(1000),
                last_24_hours: Some(10),
                this_week: Some(this_week),
                prior_week: Some(prior_week),
            },
            vec![],
        ));

        let (_, body) = json_body(get(state_with(configured(), spy), "/api/contact-stats").await).await;
        assert_eq!(body["growthRate"], expected, "{this_week} vs {prior_week}");
    }
}

#[tokio::test]
async fn missing_counts_default_to_zero() {
    let spy = Arc::new(SpyStore::new(
        SpyCounts {
            total: None,
            last_24_hours: None,
            this_week: Some(10),
            prior_week: None,
        },
        vec![],
    ));

    let (status, body) = json_body(get(state_with(configured(), spy), "/api/contact-stats").await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalContacts"], 0);
    assert_eq!(body["last24Hours"], 0);
    assert_eq!(body["growthRate"], 0.0);
}

#[tokio::test]
async fn missing_credentials_return_configuration_error_without_queries() {
    for config in [
        config_from(&[]),
        config_from(&[("SUPABASE_URL", "https://contacts.example.co")]),
        config_from(&[("SUPABASE_SERVICE_ROLE_KEY", "service-role-key")]),
    ] {
        let spy = Arc::new(SpyStore::new(SpyCounts::default(), vec![house("CA", "1")]));
        let state = state_with(config, spy.clone());

        let (status, body) = json_body(get(state, "/api/contact-stats").await).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Configuration error"}));
        assert_eq!(spy.calls(), 0);
    }
}

#[tokio::test]
async fn store_failure_returns_generic_error() {
    let spy = Arc::new(SpyStore::failing());

    let (status, body) = json_body(get(state_with(configured(), spy), "/api/contact-stats").await).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Internal server error"}));
}

#[tokio::test]
async fn stats_request_sends_no_analytics_events() {
    let sink = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .respond_with(wiremock::ResponseTemplate::new(200))
        .expect(0)
        .mount(&sink)
        .await;
    let endpoint = format!("{}/v1/track", sink.uri());
    let config = config_from(&[
        ("SUPABASE_URL", "https://contacts.example.co"),
        ("SUPABASE_SERVICE_ROLE_KEY", "service-role-key"),
        ("ANALYTICS_ENDPOINT", endpoint.as_str()),
    ]);
    let spy = Arc::new(SpyStore::new(SpyCounts::default(), vec![house("CA", "12")]));
    let state = state_with(config, spy);
    assert!(state.analytics.is_enabled());

    let (status, _) = json_body(get(state, "/api/contact-stats").await).await;
    assert_eq!(status, StatusCode::OK);

    // Give any detached delivery time to reach the sink before verification.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    sink.verify().await;
}
