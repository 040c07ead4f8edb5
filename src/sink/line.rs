use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::series::TimeSeriesTable;

/// Tag carrying the region name on every point.
pub const REGION_TAG: &str = "mk";

/// Numeric cell types that can be written as an InfluxDB float field.
pub trait FieldValue: Copy {
    fn as_field(self) -> f64;
}

impl FieldValue for i64 {
    fn as_field(self) -> f64 {
        self as f64
    }
}

impl FieldValue for f64 {
    fn as_field(self) -> f64 {
        self
    }
}

/// A single line-protocol point: `measurement,tags field=value timestamp`.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub measurement: String,
    pub tags: Vec<(String, String)>,
    pub field: String,
    pub value: f64,
    pub timestamp_ns: i64,
}

impl Point {
    pub fn to_line(&self) -> String {
        let mut line = escape(&self.measurement, &[',', ' ']);
        for (k, v) in &self.tags {
            line.push(',');
            line.push_str(&escape(k, &[',', '=', ' ']));
            line.push('=');
            line.push_str(&escape(v, &[',', '=', ' ']));
        }
        line.push(' ');
        line.push_str(&escape(&self.field, &[',', '=', ' ']));
        line.push_str(&format!("={:.6} {}", self.value, self.timestamp_ns));
        line
    }
}

fn escape(s: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Midnight UTC of `date`, in nanoseconds since the Unix epoch.
pub fn date_timestamp_ns(date: NaiveDate) -> i64 {
    date_timestamp_secs(date) * 1_000_000_000
}

pub fn date_timestamp_secs(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// One point per table cell, with `extra_tags` ahead of the region tag.
pub fn table_points<V: FieldValue>(
    measurement: &str,
    field: &str,
    table: &TimeSeriesTable<V>,
    extra_tags: &BTreeMap<String, String>,
) -> Vec<Point> {
    table
        .iter()
        .map(|(d, region, value)| {
            let mut tags: Vec<(String, String)> = extra_tags
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            tags.push((REGION_TAG.to_string(), region.to_string()));
            Point {
                measurement: measurement.to_string(),
                tags,
                field: field.to_string(),
                value: value.as_field(),
                timestamp_ns: date_timestamp_ns(d),
            }
        })
        .collect()
}
