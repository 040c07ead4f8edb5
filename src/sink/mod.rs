//! Destinations for derived series.

pub mod csv;
pub mod influx;
pub mod line;

pub use influx::InfluxSink;
pub use line::{table_points, FieldValue, Point};

use anyhow::Result;

/// Anything that accepts a batch of points.
#[allow(async_fn_in_trait)]
pub trait PointSink {
    async fn write(&mut self, points: &[Point]) -> Result<()>;
}

/// Collects points in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemorySink {
    pub points: Vec<Point>,
    pub writes: usize,
}

#[cfg(test)]
impl PointSink for MemorySink {
    async fn write(&mut self, points: &[Point]) -> Result<()> {
        self.points.extend_from_slice(points);
        self.writes += 1;
        Ok(())
    }
}
