//! Date × region tables and the transforms that derive new series from them.

pub mod exposure;
pub mod growth;
pub mod increment;
pub mod normalize;

pub use exposure::project_exposure;
pub use growth::{growth_rate, FitError};
pub use increment::increment;
pub use normalize::{normalize, PerUnit};

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// A date-indexed table of per-region values.
///
/// A missing `(date, region)` cell means "no data" and is reported as `None`
/// by [`TimeSeriesTable::get`]; callers that want a default must substitute it
/// themselves. Dates only exist once at least one cell has been inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesTable<V> {
    rows: BTreeMap<NaiveDate, BTreeMap<String, V>>,
}

impl<V> Default for TimeSeriesTable<V> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }
}

impl<V: Copy> TimeSeriesTable<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cell, overwriting any previous value for the same key.
    pub fn insert(&mut self, date: NaiveDate, region: impl Into<String>, value: V) {
        self.rows.entry(date).or_default().insert(region.into(), value);
    }

    pub fn get(&self, date: NaiveDate, region: &str) -> Option<V> {
        self.rows.get(&date)?.get(region).copied()
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.rows.contains_key(&date)
    }

    /// All regions recorded for `date`, with their values.
    pub fn row(&self, date: NaiveDate) -> impl Iterator<Item = (&str, V)> + '_ {
        self.rows
            .get(&date)
            .into_iter()
            .flat_map(|r| r.iter().map(|(k, v)| (k.as_str(), *v)))
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.keys().copied()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.keys().next().copied()
    }

    /// Sorted union of every region key in the table.
    pub fn regions(&self) -> BTreeSet<&str> {
        self.rows
            .values()
            .flat_map(|r| r.keys().map(String::as_str))
            .collect()
    }

    /// Every `(date, region, value)` triple, in date then region order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &str, V)> + '_ {
        self.rows
            .iter()
            .flat_map(|(d, r)| r.iter().map(move |(k, v)| (*d, k.as_str(), *v)))
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<V: Copy, S: Into<String>> FromIterator<(NaiveDate, S, V)> for TimeSeriesTable<V> {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, S, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (date, region, value) in iter {
            table.insert(date, region, value);
        }
        table
    }
}

#[cfg(test)]
pub(crate) fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 3, 1).unwrap() + chrono::Duration::days(n as i64)
}
