// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::info;

pub mod records;

pub use records::{build_totals, region_key, TestRecord};

/// County-level cumulative test results published by the Estonian health board.
pub static DEFAULT_FEED_URL: &str =
    "https://opendata.digilugu.ee/opendata_covid19_test_county_all.json";

/// Download the feed and decode it as a JSON array of [`TestRecord`]s.
pub async fn fetch_records(client: &Client, url: &str) -> Result<Vec<TestRecord>> {
    let body = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {}", url))?
        .error_for_status()?
        .bytes()
        .await
        .with_context(|| format!("reading body from {}", url))?;

    let records = parse_records(&body).with_context(|| format!("decoding feed from {}", url))?;
    info!(url, records = records.len(), bytes = body.len(), "feed fetched");
    Ok(records)
}

/// Decode a feed document that is already in memory.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<TestRecord>> {
    Ok(serde_json::from_slice(bytes)?)
}
