//! CSV export of the spending table.

use crate::errors::AppError;
use crate::services::budget::Recalculation;

/// Serialize a recalculated spending table as CSV, with a trailing total row.
pub fn spending_csv(recalculation: &Recalculation) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let csv_err = |e: csv::Error| AppError::Internal(format!("CSV write failed: {e}"));

    writer
        .write_record([
            "category_id",
            "category",
            "adjustment_percent",
            "original_billions",
            "adjusted_billions",
            "delta_billions",
        ])
        .map_err(csv_err)?;

    for category in &recalculation.categories {
        writer
            .write_record([
                category.id.clone(),
                category.name.clone(),
                category.percent.to_string(),
                category.original_billions.to_string(),
                category.adjusted_billions.to_string(),
                category.delta_billions.to_string(),
            ])
            .map_err(csv_err)?;
    }

    writer
        .write_record([
            "total".to_string(),
            "Total".to_string(),
            recalculation.delta_percent.to_string(),
            recalculation.original_total_billions.to_string(),
            recalculation.adjusted_total_billions.to_string(),
            recalculation.delta_billions.to_string(),
        ])
        .map_err(csv_err)?;

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV flush failed: {e}")))
}

/// Attachment filename for a fiscal year export.
pub fn spending_filename(fiscal_year: u16) -> String {
    format!("spending-FY{fiscal_year}.csv")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::budget::BudgetDataset;
    use crate::services::budget::{self, Adjustment, RecalculateRequest};

    fn parse(bytes: &[u8]) -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes)
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn baseline_export_has_one_row_per_category_plus_total() {
        let dataset = BudgetDataset::embedded().unwrap();
        let baseline = budget::recalculate(&dataset, &RecalculateRequest::default()).unwrap();
        let rows = parse(&spending_csv(&baseline).unwrap());

        assert_eq!(rows.len(), dataset.spending.len() + 1);
        assert_eq!(rows[0][0], dataset.spending[0].id);
        let total = rows.last().unwrap();
        assert_eq!(total[0], "total");
        assert_eq!(total[5], "0");
    }

    #[test]
    fn adjusted_category_row_round_trips() {
        let dataset = BudgetDataset::embedded().unwrap();
        let request = RecalculateRequest {
            adjustments: vec![Adjustment {
                category: "education".to_string(),
                percent: 10.0,
            }],
        };
        let recalculation = budget::recalculate(&dataset, &request).unwrap();
        let bytes = spending_csv(&recalculation).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("category_id,category,"));

        let education = parse(&bytes)
            .into_iter()
            .find(|r| r[0] == "education")
            .unwrap();
        assert_eq!(education[1], "Education & Training");
        assert_eq!(education[2], "10");
    }

    #[test]
    fn filename_includes_fiscal_year() {
        assert_eq!(spending_filename(2024), "spending-FY2024.csv");
    }
}
