use anyhow::{bail, Result};
use std::collections::BTreeMap;
use std::io::Write;
use tracing::info;

use crate::regions::RegionRegistry;
use crate::series::{growth_rate, increment, normalize, project_exposure, TimeSeriesTable};
use crate::sink::{self, table_points, Point, PointSink};

/// Per-capita unit used by every `*100k` series.
pub const PER_CAPITA: u64 = 100_000;

/// Trailing window, in days, of the growth fits.
const GROWTH_WINDOW: usize = 7;
/// Days between exposure and a positive test.
const TRANSMISSION_DELAY: i32 = 5;
const EXPOSURE_OFFSET: i64 = 7;
const EXPOSURE_HALF_WIDTH: usize = 5;

/// Cell values of a derived series.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesValues {
    Count(TimeSeriesTable<i64>),
    Rate(TimeSeriesTable<f64>),
}

/// A derived table and the field name it is published under.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSeries {
    pub field: &'static str,
    pub values: SeriesValues,
}

impl NamedSeries {
    fn count(field: &'static str, table: TimeSeriesTable<i64>) -> Self {
        Self {
            field,
            values: SeriesValues::Count(table),
        }
    }

    fn rate(field: &'static str, table: TimeSeriesTable<f64>) -> Self {
        Self {
            field,
            values: SeriesValues::Rate(table),
        }
    }

    pub fn len(&self) -> usize {
        match &self.values {
            SeriesValues::Count(t) => t.len(),
            SeriesValues::Rate(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn points(&self, measurement: &str, tags: &BTreeMap<String, String>) -> Vec<Point> {
        match &self.values {
            SeriesValues::Count(t) => table_points(measurement, self.field, t, tags),
            SeriesValues::Rate(t) => table_points(measurement, self.field, t, tags),
        }
    }

    pub fn write_csv<W: Write>(&self, out: W, registry: &RegionRegistry) -> Result<()> {
        match &self.values {
            SeriesValues::Count(t) => sink::csv::write_csv(out, t, registry),
            SeriesValues::Rate(t) => sink::csv::write_csv(out, t, registry),
        }
    }
}

/// Every published series, derived from the cumulative totals.
///
/// The daily, weekly and 14-day branches only depend on `totals`; growth and
/// exposure read the 14-day and daily tables respectively.
pub fn derive_series(
    totals: &TimeSeriesTable<i64>,
    registry: &RegionRegistry,
) -> Vec<NamedSeries> {
    let daily = increment(totals, 1);
    let weekly = increment(totals, 7);
    let pos = increment(totals, 14);

    let r0 = growth_rate(&pos, GROWTH_WINDOW, TRANSMISSION_DELAY);
    let dailyinc = growth_rate(&pos, GROWTH_WINDOW, 1);

    let exposure = project_exposure(&daily, EXPOSURE_OFFSET, EXPOSURE_HALF_WIDTH);
    let exposure100k = normalize(&exposure, registry, PER_CAPITA);

    let daily100k = normalize(&daily, registry, PER_CAPITA);
    let weekly100k = normalize(&weekly, registry, PER_CAPITA);
    let pos100k = normalize(&pos, registry, PER_CAPITA);

    let series = vec![
        NamedSeries::count("total", totals.clone()),
        NamedSeries::count("daily", daily),
        NamedSeries::count("daily100k", daily100k),
        NamedSeries::count("weekly", weekly),
        NamedSeries::count("weekly100k", weekly100k),
        NamedSeries::count("pos", pos),
        NamedSeries::count("pos100k", pos100k),
        NamedSeries::rate("r0", r0),
        NamedSeries::rate("dailyinc", dailyinc),
        NamedSeries::rate("exposure", exposure),
        NamedSeries::rate("exposure100k", exposure100k),
    ];
    for s in &series {
        info!(field = s.field, cells = s.len(), "series derived");
    }
    series
}

/// Hand every series to `sink`, one write per series. Returns the point count.
pub async fn publish<S: PointSink>(
    sink: &mut S,
    series: &[NamedSeries],
    measurement: &str,
    tags: &BTreeMap<String, String>,
) -> Result<usize> {
    let mut written = 0;
    for s in series {
        let points = s.points(measurement, tags);
        sink.write(&points).await?;
        written += points.len();
    }
    Ok(written)
}

/// Print the series named `field` as CSV.
pub fn print_csv<W: Write>(
    out: W,
    series: &[NamedSeries],
    field: &str,
    registry: &RegionRegistry,
) -> Result<()> {
    match series.iter().find(|s| s.field == field) {
        Some(s) => s.write_csv(out, registry),
        None => bail!("unknown series {:?}", field),
    }
}
