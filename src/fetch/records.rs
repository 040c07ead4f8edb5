use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::regions::AGGREGATE_REGION;
use crate::series::TimeSeriesTable;

/// One row of the county test-result feed. Fields the pipeline does not use
/// are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TestRecord {
    pub result_value: String,
    pub statistics_date: NaiveDate,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
    pub total_cases: i64,
}

impl TestRecord {
    pub fn is_positive(&self) -> bool {
        self.result_value == "P"
    }

    pub fn region(&self) -> String {
        region_key(
            self.country.as_deref().unwrap_or_default(),
            self.county.as_deref().unwrap_or_default(),
        )
    }
}

/// `"Eesti" + "Harju maakond"` → `"Harju"`; `"Välismaa" + ""` → `"Välismaa"`.
pub fn region_key(country: &str, county: &str) -> String {
    format!("{} {}", country, county)
        .replace(" maakond", "")
        .replace("Eesti ", "")
        .trim()
        .to_string()
}

/// Cumulative positives per date and region, plus the nationwide
/// [`AGGREGATE_REGION`] sum for every date.
pub fn build_totals(records: &[TestRecord]) -> TimeSeriesTable<i64> {
    let mut totals: TimeSeriesTable<i64> = records
        .iter()
        .filter(|r| r.is_positive())
        .map(|r| (r.statistics_date, r.region(), r.total_cases))
        .collect();

    let sums: Vec<_> = totals
        .dates()
        .map(|d| (d, totals.row(d).map(|(_, v)| v).sum::<i64>()))
        .collect();
    for (d, sum) in sums {
        totals.insert(d, AGGREGATE_REGION, sum);
    }

    debug!(
        input = records.len(),
        dates = totals.dates().count(),
        cells = totals.len(),
        "totals table built"
    );
    totals
}
