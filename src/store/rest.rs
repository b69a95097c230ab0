//! Contacts store backed by the hosted table API (PostgREST).
//!
//! Counts are read from the `Content-Range` header of a `HEAD` request sent
//! with `Prefer: count=exact`. The join uses resource embedding through the
//! `contacts.member_id` foreign key and is fetched page by page.

use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::header::{HeaderMap, CONTENT_RANGE};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::Deserialize;

use super::{ContactStore, ContactWindow, StoreError};
use crate::models::contact::{ContactMemberRow, RawContactMemberRow, RawMember};

const CONTACTS_TABLE: &str = "contacts";
const JOIN_SELECT: &str = "zip_code,member:congress_members(state,district,chamber)";
const JOIN_ORDER: &str = "id.asc";
const PAGE_SIZE: usize = 1000;

/// HTTP implementation of [`ContactStore`].
#[derive(Debug, Clone)]
pub struct RestContactStore {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

/// Embedded relation as returned by PostgREST: an object for many-to-one,
/// an array when the relationship is ambiguous.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EmbeddedMember {
    One(RawMember),
    Many(Vec<RawMember>),
}

#[derive(Debug, Deserialize)]
struct JoinedRow {
    zip_code: Option<String>,
    member: Option<EmbeddedMember>,
}

impl TryFrom<JoinedRow> for RawContactMemberRow {
    type Error = StoreError;

    fn try_from(row: JoinedRow) -> Result<Self, Self::Error> {
        let member = match row.member {
            None => None,
            Some(EmbeddedMember::One(member)) => Some(member),
            Some(EmbeddedMember::Many(mut members)) => match members.len() {
                0 => None,
                1 => members.pop(),
                n => {
                    return Err(StoreError::Malformed(format!(
                        "contact joined to {n} members"
                    )))
                }
            },
        };
        Ok(Self {
            zip_code: row.zip_code,
            member,
        })
    }
}

impl RestContactStore {
    /// Create a store client for the project at `base_url` using a service key.
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, service_key)
    }

    /// Create a store client with a preconfigured `reqwest::Client` (timeouts, proxies).
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        service_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
        }
    }

    fn table_url(&self, table: &str, params: &[(&str, String)]) -> Result<Url, StoreError> {
        let mut url = Url::parse(&format!("{}/rest/v1/{}", self.base_url, table))
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }
}

/// Render `contacted_at` filters in PostgREST operator syntax.
fn window_filters(window: &ContactWindow) -> Vec<(&'static str, String)> {
    let mut filters = Vec::with_capacity(2);
    if let Some(since) = window.since {
        filters.push((
            "contacted_at",
            format!("gte.{}", since.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ));
    }
    if let Some(until) = window.until {
        filters.push((
            "contacted_at",
            format!("lt.{}", until.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ));
    }
    filters
}

/// Extract the total from a `Content-Range` header such as `0-24/573` or `*/573`.
fn parse_total(headers: &HeaderMap) -> Result<Option<i64>, StoreError> {
    let Some(value) = headers.get(CONTENT_RANGE) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| StoreError::Malformed("non-ASCII Content-Range".to_string()))?;
    let total = value
        .rsplit_once('/')
        .map(|(_, total)| total.trim())
        .ok_or_else(|| StoreError::Malformed(format!("Content-Range without total: {value}")))?;

    if total == "*" {
        return Ok(None);
    }
    total
        .parse::<i64>()
        .map(Some)
        .map_err(|_| StoreError::Malformed(format!("Content-Range total is not a number: {value}")))
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    // 206 is returned for ranged reads.
    if status.is_success() || status == StatusCode::PARTIAL_CONTENT {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ContactStore for RestContactStore {
    async fn count_contacts(&self, window: ContactWindow) -> Result<Option<i64>, StoreError> {
        let mut params = vec![("select", "zip_code".to_string())];
        params.extend(window_filters(&window));
        let request = self
            .client
            .head(self.table_url(CONTACTS_TABLE, &params)?)
            .header("Prefer", "count=exact");

        let response = ensure_success(self.authorized(request).send().await?).await?;
        parse_total(response.headers())
    }

    async fn list_contact_members(&self) -> Result<Vec<ContactMemberRow>, StoreError> {
        // Range paging needs a stable row order across requests.
        let url = self.table_url(
            CONTACTS_TABLE,
            &[
                ("select", JOIN_SELECT.to_string()),
                ("order", JOIN_ORDER.to_string()),
            ],
        )?;
        let mut rows = Vec::new();
        let mut offset = 0usize;

        loop {
            let request = self
                .client
                .get(url.clone())
                .header("Range-Unit", "items")
                .header("Range", format!("{}-{}", offset, offset + PAGE_SIZE - 1));

            let response = ensure_success(self.authorized(request).send().await?).await?;
            let page: Vec<JoinedRow> = response.json().await?;
            let fetched = page.len();

            for joined in page {
                let raw = RawContactMemberRow::try_from(joined)?;
                rows.push(ContactMemberRow::try_from(raw)?);
            }

            if fetched < PAGE_SIZE {
                break;
            }
            offset += PAGE_SIZE;
        }

        tracing::debug!(rows = rows.len(), "Fetched contact member rows");
        Ok(rows)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let url = self.table_url(
            CONTACTS_TABLE,
            &[("select", "zip_code".to_string()), ("limit", "1".to_string())],
        )?;
        let request = self.client.head(url);
        ensure_success(self.authorized(request).send().await?).await?;
        Ok(())
    }
}
