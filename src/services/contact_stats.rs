//! Contact volume report: totals, trailing windows, top districts and
//! week-over-week growth.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::contact::ContactMemberRow;
use crate::store::{ContactStore, ContactWindow};

/// Number of districts kept in the ranking.
pub const TOP_DISTRICTS: usize = 5;

/// Aggregated contact statistics returned by `GET /api/contact-stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactStats {
    pub total_contacts: i64,
    pub last_24_hours: i64,
    pub top_districts: Vec<RankedDistrict>,
    /// Percent change of this week over the prior week, one decimal place.
    pub growth_rate: f64,
}

/// Contact count for a single district key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedDistrict {
    pub district: String,
    pub count: i64,
}

/// Raw counts as reported by the store, before coalescing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowCounts {
    pub total: Option<i64>,
    pub last_24_hours: Option<i64>,
    pub this_week: Option<i64>,
    pub prior_week: Option<i64>,
}

/// Counts after missing values have been replaced by zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoalescedCounts {
    pub total: i64,
    pub last_24_hours: i64,
    pub this_week: i64,
    pub prior_week: i64,
}

impl WindowCounts {
    /// Replace every absent count with `0`.
    pub fn coalesce(self) -> CoalescedCounts {
        CoalescedCounts {
            total: self.total.unwrap_or(0),
            last_24_hours: self.last_24_hours.unwrap_or(0),
            this_week: self.this_week.unwrap_or(0),
            prior_week: self.prior_week.unwrap_or(0),
        }
    }
}

/// Trailing windows relative to `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Windows {
    pub last_24_hours: ContactWindow,
    pub this_week: ContactWindow,
    pub prior_week: ContactWindow,
}

impl Windows {
    pub fn ending_at(now: DateTime<Utc>) -> Self {
        let day_ago = now - Duration::hours(24);
        let week_ago = now - Duration::days(7);
        let two_weeks_ago = now - Duration::days(14);
        Self {
            last_24_hours: ContactWindow::since(day_ago),
            this_week: ContactWindow::since(week_ago),
            prior_week: ContactWindow::between(two_weeks_ago, week_ago),
        }
    }
}

/// Build the contact statistics report.
///
/// Fails with [`AppError::Configuration`] before any query when no store is
/// configured. Any store failure aborts the whole report.
pub async fn get_contact_stats(
    store: Option<&dyn ContactStore>,
    now: DateTime<Utc>,
) -> Result<ContactStats, AppError> {
    let store = store.ok_or(AppError::Configuration)?;
    let windows = Windows::ending_at(now);

    let (total, last_24_hours, this_week, prior_week) = tokio::try_join!(
        store.count_contacts(ContactWindow::all()),
        store.count_contacts(windows.last_24_hours),
        store.count_contacts(windows.this_week),
        store.count_contacts(windows.prior_week),
    )?;
    let counts = WindowCounts {
        total,
        last_24_hours,
        this_week,
        prior_week,
    }
    .coalesce();

    let rows = store.list_contact_members().await?;
    let top_districts = rank_districts(group_by_district(&rows), TOP_DISTRICTS);

    tracing::debug!(
        total = counts.total,
        rows = rows.len(),
        districts = top_districts.len(),
        "Aggregated contact stats"
    );

    Ok(ContactStats {
        total_contacts: counts.total,
        last_24_hours: counts.last_24_hours,
        top_districts,
        growth_rate: growth_rate(counts.this_week, counts.prior_week),
    })
}

/// Count rows per district key. Keys appear only if at least one row maps to them.
pub fn group_by_district(rows: &[ContactMemberRow]) -> HashMap<String, i64> {
    let mut counts = HashMap::new();
    for row in rows {
        *counts.entry(row.district_key()).or_insert(0) += 1;
    }
    counts
}

/// Sort by count descending, ties by key ascending, and keep the first `limit`.
pub fn rank_districts(counts: HashMap<String, i64>, limit: usize) -> Vec<RankedDistrict> {
    let mut ranked: Vec<RankedDistrict> = counts
        .into_iter()
        .map(|(district, count)| RankedDistrict { district, count })
        .collect();
    ranked.sort_by(|a, b| {
        Reverse(a.count)
            .cmp(&Reverse(b.count))
            .then_with(|| a.district.cmp(&b.district))
    });
    ranked.truncate(limit);
    ranked
}

/// Percent change from `prior_week` to `this_week`, rounded to one decimal.
/// Zero when there is no prior-week baseline.
pub fn growth_rate(this_week: i64, prior_week: i64) -> f64 {
    if prior_week <= 0 {
        return 0.0;
    }
    let growth = (this_week - prior_week) as f64 / prior_week as f64 * 100.0;
    round_one_decimal(growth)
}

/// Round half away from zero to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
