//! Spending and defense breakdowns, and slider-driven recalculation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::AppError;
use crate::models::budget::{Bill, BillStatus, BudgetDataset};
use crate::services::contact_stats::round_one_decimal;

/// Spending category with its share of the total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    pub id: String,
    pub name: String,
    pub amount_billions: f64,
    pub share_percent: f64,
    pub mandatory: bool,
}

/// Spending view: categories and the overall total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingOverview {
    pub fiscal_year: u16,
    pub total_billions: f64,
    pub mandatory_billions: f64,
    pub discretionary_billions: f64,
    pub categories: Vec<CategoryShare>,
}

/// Defense branch with its share of the defense total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchShare {
    pub branch: String,
    pub amount_billions: f64,
    pub share_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilitaryOverview {
    pub fiscal_year: u16,
    pub total_billions: f64,
    pub branches: Vec<BranchShare>,
}

/// One slider position: percent change applied to a category.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Adjustment {
    #[validate(length(min = 1))]
    pub category: String,
    #[validate(range(min = -100.0, max = 100.0))]
    pub percent: f64,
}

/// Body of `POST /api/budget/spending/recalculate`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RecalculateRequest {
    #[validate(nested)]
    #[serde(default)]
    pub adjustments: Vec<Adjustment>,
}

/// A category before and after its adjustment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustedCategory {
    pub id: String,
    pub name: String,
    pub percent: f64,
    pub original_billions: f64,
    pub adjusted_billions: f64,
    pub delta_billions: f64,
}

/// Result of applying slider adjustments to the spending dataset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recalculation {
    pub fiscal_year: u16,
    pub original_total_billions: f64,
    pub adjusted_total_billions: f64,
    pub delta_billions: f64,
    pub delta_percent: f64,
    pub categories: Vec<AdjustedCategory>,
}

/// Share of `part` in `total` as a percentage with one decimal.
fn share(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        round_one_decimal(part / total * 100.0)
    } else {
        0.0
    }
}

/// Round a dollar amount in billions to two decimals.
fn round_billions(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn spending_overview(dataset: &BudgetDataset) -> SpendingOverview {
    let total: f64 = dataset.spending.iter().map(|c| c.amount_billions).sum();
    let mandatory: f64 = dataset
        .spending
        .iter()
        .filter(|c| c.mandatory)
        .map(|c| c.amount_billions)
        .sum();

    SpendingOverview {
        fiscal_year: dataset.fiscal_year,
        total_billions: round_billions(total),
        mandatory_billions: round_billions(mandatory),
        discretionary_billions: round_billions(total - mandatory),
        categories: dataset
            .spending
            .iter()
            .map(|c| CategoryShare {
                id: c.id.clone(),
                name: c.name.clone(),
                amount_billions: c.amount_billions,
                share_percent: share(c.amount_billions, total),
                mandatory: c.mandatory,
            })
            .collect(),
    }
}

pub fn military_overview(dataset: &BudgetDataset) -> MilitaryOverview {
    let total: f64 = dataset.military.iter().map(|b| b.amount_billions).sum();
    MilitaryOverview {
        fiscal_year: dataset.fiscal_year,
        total_billions: round_billions(total),
        branches: dataset
            .military
            .iter()
            .map(|b| BranchShare {
                branch: b.branch.clone(),
                amount_billions: b.amount_billions,
                share_percent: share(b.amount_billions, total),
            })
            .collect(),
    }
}

/// Bills, optionally restricted to one legislative status.
pub fn list_bills(dataset: &BudgetDataset, status: Option<BillStatus>) -> Vec<Bill> {
    dataset
        .bills
        .iter()
        .filter(|b| status.map_or(true, |s| b.status == s))
        .cloned()
        .collect()
}

/// Apply slider adjustments. Categories without an adjustment keep their amount.
pub fn recalculate(
    dataset: &BudgetDataset,
    request: &RecalculateRequest,
) -> Result<Recalculation, AppError> {
    request.validate()?;

    let mut seen = HashSet::new();
    for adjustment in &request.adjustments {
        if dataset.category(&adjustment.category).is_none() {
            return Err(AppError::Validation(format!(
                "Unknown spending category '{}'",
                adjustment.category
            )));
        }
        if !seen.insert(adjustment.category.as_str()) {
            return Err(AppError::Validation(format!(
                "Category '{}' adjusted more than once",
                adjustment.category
            )));
        }
    }

    let categories: Vec<AdjustedCategory> = dataset
        .spending
        .iter()
        .map(|c| {
            let percent = request
                .adjustments
                .iter()
                .find(|a| a.category == c.id)
                .map_or(0.0, |a| a.percent);
            let adjusted = c.amount_billions * (1.0 + percent / 100.0);
            AdjustedCategory {
                id: c.id.clone(),
                name: c.name.clone(),
                percent,
                original_billions: c.amount_billions,
                adjusted_billions: round_billions(adjusted),
                delta_billions: round_billions(adjusted - c.amount_billions),
            }
        })
        .collect();

    let original: f64 = dataset.spending.iter().map(|c| c.amount_billions).sum();
    let adjusted: f64 = categories.iter().map(|c| c.adjusted_billions).sum();
    let delta = adjusted - original;

    Ok(Recalculation {
        fiscal_year: dataset.fiscal_year,
        original_total_billions: round_billions(original),
        adjusted_total_billions: round_billions(adjusted),
        delta_billions: round_billions(delta),
        delta_percent: share(delta, original),
        categories,
    })
}
