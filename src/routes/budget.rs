//! Budget dataset routes: spending, recalculation, export, taxes, bills and defense.

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::analytics::AnalyticsEvent;
use crate::errors::AppError;
use crate::models::budget::{Bill, BillStatus, TaxSchedules};
use crate::services::budget::{
    self as budget_service, MilitaryOverview, RecalculateRequest, Recalculation, SpendingOverview,
};
use crate::services::export;
use crate::services::tax::{self, TaxEstimate, TaxEstimateQuery};
use crate::AppState;

/// Optional status filter for the bill list.
#[derive(Debug, Clone, Deserialize)]
pub struct BillFilters {
    pub status: Option<BillStatus>,
}

/// GET /api/budget/spending — categories with shares of the total.
pub async fn spending(State(state): State<AppState>) -> Json<SpendingOverview> {
    Json(budget_service::spending_overview(&state.budget))
}

/// POST /api/budget/spending/recalculate — apply slider adjustments.
pub async fn recalculate(
    State(state): State<AppState>,
    Json(body): Json<RecalculateRequest>,
) -> Result<Json<Recalculation>, AppError> {
    let result = budget_service::recalculate(&state.budget, &body)?;
    state.analytics.track_detached(
        AnalyticsEvent::new("spending_recalculated")
            .with_property("adjustments", body.adjustments.len())
            .with_property("deltaPercent", result.delta_percent),
    );
    Ok(Json(result))
}

/// GET /api/budget/spending/export — baseline spending table as CSV.
pub async fn export_baseline(State(state): State<AppState>) -> Result<Response, AppError> {
    export_csv(&state, &RecalculateRequest::default())
}

/// POST /api/budget/spending/export — adjusted spending table as CSV.
pub async fn export_adjusted(
    State(state): State<AppState>,
    Json(body): Json<RecalculateRequest>,
) -> Result<Response, AppError> {
    export_csv(&state, &body)
}

fn export_csv(state: &AppState, request: &RecalculateRequest) -> Result<Response, AppError> {
    let recalculation = budget_service::recalculate(&state.budget, request)?;
    let bytes = export::spending_csv(&recalculation)?;
    let filename = export::spending_filename(recalculation.fiscal_year);

    state.analytics.track_detached(
        AnalyticsEvent::new("spending_exported")
            .with_property("fiscalYear", recalculation.fiscal_year)
            .with_property("adjusted", !request.adjustments.is_empty()),
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// GET /api/budget/tax-brackets — bracket schedules for every filing status.
pub async fn tax_brackets(State(state): State<AppState>) -> Json<TaxSchedules> {
    Json(state.budget.tax_brackets.clone())
}

/// GET /api/budget/tax/estimate — progressive tax for an income.
pub async fn tax_estimate(
    State(state): State<AppState>,
    Query(query): Query<TaxEstimateQuery>,
) -> Result<Json<TaxEstimate>, AppError> {
    let brackets = state.budget.tax_brackets.for_status(query.filing_status);
    let estimate = tax::estimate(brackets, &query)?;
    Ok(Json(estimate))
}

/// GET /api/budget/bills — bills with budget impact, optionally filtered by status.
pub async fn bills(
    State(state): State<AppState>,
    Query(filters): Query<BillFilters>,
) -> Json<Vec<Bill>> {
    Json(budget_service::list_bills(&state.budget, filters.status))
}

/// GET /api/budget/military — defense spending by branch.
pub async fn military(State(state): State<AppState>) -> Json<MilitaryOverview> {
    Json(budget_service::military_overview(&state.budget))
}
