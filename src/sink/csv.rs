use anyhow::Result;
use std::fmt::Display;
use std::io::Write;

use super::line::date_timestamp_secs;
use crate::regions::RegionRegistry;
use crate::series::TimeSeriesTable;

/// Debug dump of one table: a header of region names in registry order, then
/// one row per date keyed by its Unix timestamp. Absent cells are empty.
pub fn write_csv<W, V>(out: W, table: &TimeSeriesTable<V>, registry: &RegionRegistry) -> Result<()>
where
    W: Write,
    V: Copy + Display,
{
    let mut wtr = ::csv::WriterBuilder::new().flexible(false).from_writer(out);

    let mut header = vec![String::new()];
    header.extend(registry.names().map(str::to_string));
    wtr.write_record(&header)?;

    for d in table.dates() {
        let mut row = vec![date_timestamp_secs(d).to_string()];
        row.extend(
            registry
                .names()
                .map(|r| table.get(d, r).map(|v| v.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
