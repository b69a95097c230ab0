//! Fiscal datasets behind the dashboard views.
//!
//! A [`BudgetDataset`] is loaded once at startup, validated, and shared
//! read-only through application state.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Dataset compiled into the binary, used when no override path is configured.
const EMBEDDED_DATASET: &str = include_str!("../../data/budget.json");

/// A top-level federal spending category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingCategory {
    pub id: String,
    pub name: String,
    pub amount_billions: f64,
    pub mandatory: bool,
}

/// Single marginal tax bracket. `max` is `None` for the top bracket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBracket {
    pub rate_percent: f64,
    pub min: f64,
    pub max: Option<f64>,
}

/// Filing status selecting a bracket schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilingStatus {
    Single,
    MarriedJoint,
}

/// Bracket schedules by filing status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxSchedules {
    pub single: Vec<TaxBracket>,
    pub married_joint: Vec<TaxBracket>,
}

impl TaxSchedules {
    pub fn for_status(&self, status: FilingStatus) -> &[TaxBracket] {
        match status {
            FilingStatus::Single => &self.single,
            FilingStatus::MarriedJoint => &self.married_joint,
        }
    }
}

/// Legislative progress of a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    Introduced,
    PassedHouse,
    PassedSenate,
    Enacted,
    Vetoed,
}

/// A bill with a budgetary impact estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: String,
    pub title: String,
    pub status: BillStatus,
    pub sponsor: String,
    /// Ten-year cost estimate; negative values are savings.
    pub cost_billions: f64,
    pub summary: String,
}

/// Defense spending by service branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilitaryBranch {
    pub branch: String,
    pub amount_billions: f64,
}

/// All datasets rendered by the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetDataset {
    pub fiscal_year: u16,
    pub spending: Vec<SpendingCategory>,
    pub tax_brackets: TaxSchedules,
    pub bills: Vec<Bill>,
    pub military: Vec<MilitaryBranch>,
}

/// Dataset could not be read or failed validation.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid dataset JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid dataset: {0}")]
    Invalid(String),
}

impl BudgetDataset {
    /// Load the dataset compiled into the binary.
    pub fn embedded() -> Result<Self, DatasetError> {
        Self::from_json(EMBEDDED_DATASET)
    }

    /// Load a dataset from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, DatasetError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        let dataset: Self = serde_json::from_str(json)?;
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn category(&self, id: &str) -> Option<&SpendingCategory> {
        self.spending.iter().find(|c| c.id == id)
    }

    fn validate(&self) -> Result<(), DatasetError> {
        if self.spending.is_empty() {
            return Err(DatasetError::Invalid("spending has no categories".into()));
        }

        let mut seen = HashSet::new();
        for category in &self.spending {
            if !seen.insert(category.id.as_str()) {
                return Err(DatasetError::Invalid(format!(
                    "duplicate spending category '{}'",
                    category.id
                )));
            }
            if !category.amount_billions.is_finite() || category.amount_billions < 0.0 {
                return Err(DatasetError::Invalid(format!(
                    "spending category '{}' has an invalid amount",
                    category.id
                )));
            }
        }

        for branch in &self.military {
            if !branch.amount_billions.is_finite() || branch.amount_billions < 0.0 {
                return Err(DatasetError::Invalid(format!(
                    "military branch '{}' has an invalid amount",
                    branch.branch
                )));
            }
        }

        validate_brackets("single", &self.tax_brackets.single)?;
        validate_brackets("marriedJoint", &self.tax_brackets.married_joint)?;
        Ok(())
    }
}

/// Brackets must start at zero, be contiguous, and end open-ended.
fn validate_brackets(label: &str, brackets: &[TaxBracket]) -> Result<(), DatasetError> {
    let invalid = |msg: &str| DatasetError::Invalid(format!("{label} brackets: {msg}"));

    let first = brackets.first().ok_or_else(|| invalid("empty schedule"))?;
    if first.min != 0.0 {
        return Err(invalid("first bracket must start at 0"));
    }

    for pair in brackets.windows(2) {
        match pair[0].max {
            Some(max) if max == pair[1].min && max > pair[0].min => {}
            _ => return Err(invalid("brackets must be contiguous and ascending")),
        }
    }

    if brackets.last().is_some_and(|b| b.max.is_some()) {
        return Err(invalid("top bracket must be open-ended"));
    }
    if brackets
        .iter()
        .any(|b| !(0.0..=100.0).contains(&b.rate_percent))
    {
        return Err(invalid("rates must be between 0 and 100"));
    }
    Ok(())
}
