use chrono::Duration;
use std::ops::Sub;

use super::TimeSeriesTable;

/// `days`-day difference of a cumulative table against itself.
///
/// Dates without a reference row `days` earlier are skipped, as are regions
/// missing from the reference row. Negative results (feed corrections) pass
/// through unchanged.
pub fn increment<V>(table: &TimeSeriesTable<V>, days: i64) -> TimeSeriesTable<V>
where
    V: Copy + Sub<Output = V>,
{
    let mut out = TimeSeriesTable::new();
    for d in table.dates() {
        let dref = d - Duration::days(days);
        if !table.contains_date(dref) {
            continue;
        }
        for (region, value) in table.row(d) {
            if let Some(prev) = table.get(dref, region) {
                out.insert(d, region, value - prev);
            }
        }
    }
    out
}
