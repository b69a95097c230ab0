//! Progressive income tax estimate over the dataset's bracket schedules.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::AppError;
use crate::models::budget::{FilingStatus, TaxBracket};
use crate::services::contact_stats::round_one_decimal;

/// Query for `GET /api/budget/tax/estimate`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaxEstimateQuery {
    #[validate(range(min = 0.0, max = 1.0e12))]
    pub income: f64,
    #[serde(default = "default_filing_status")]
    pub filing_status: FilingStatus,
}

fn default_filing_status() -> FilingStatus {
    FilingStatus::Single
}

/// Tax owed within one bracket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketTax {
    pub rate_percent: f64,
    pub taxable_amount: f64,
    pub tax: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxEstimate {
    pub income: f64,
    pub filing_status: FilingStatus,
    pub total_tax: f64,
    pub effective_rate_percent: f64,
    pub marginal_rate_percent: f64,
    pub brackets: Vec<BracketTax>,
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Estimate tax for `query.income` under the schedule for its filing status.
pub fn estimate(brackets: &[TaxBracket], query: &TaxEstimateQuery) -> Result<TaxEstimate, AppError> {
    query.validate()?;
    let income = query.income;

    let mut total = 0.0;
    let mut marginal = brackets.first().map_or(0.0, |b| b.rate_percent);
    let mut breakdown = Vec::new();

    for bracket in brackets {
        if income <= bracket.min {
            break;
        }
        let upper = bracket.max.map_or(income, |max| income.min(max));
        let taxable = upper - bracket.min;
        let tax = taxable * bracket.rate_percent / 100.0;
        total += tax;
        marginal = bracket.rate_percent;
        breakdown.push(BracketTax {
            rate_percent: bracket.rate_percent,
            taxable_amount: round_cents(taxable),
            tax: round_cents(tax),
        });
    }

    let effective = if income > 0.0 {
        round_one_decimal(total / income * 100.0)
    } else {
        0.0
    };

    Ok(TaxEstimate {
        income,
        filing_status: query.filing_status,
        total_tax: round_cents(total),
        effective_rate_percent: effective,
        marginal_rate_percent: marginal,
        brackets: breakdown,
    })
}
