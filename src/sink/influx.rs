use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use super::{Point, PointSink};

/// InfluxDB 1.x HTTP writer using the line protocol.
pub struct InfluxSink {
    client: Client,
    write_url: Url,
    batch_size: usize,
}

impl InfluxSink {
    /// `batch_size` is the maximum number of lines per request.
    pub fn new(
        client: Client,
        host: &str,
        port: u16,
        database: &str,
        batch_size: usize,
    ) -> Result<Self> {
        let mut write_url = Url::parse(&format!("http://{}:{}/write", host, port))
            .with_context(|| format!("building InfluxDB URL for {}:{}", host, port))?;
        write_url.query_pairs_mut().append_pair("db", database);
        Ok(Self {
            client,
            write_url,
            batch_size: batch_size.max(1),
        })
    }

    pub fn write_url(&self) -> &Url {
        &self.write_url
    }
}

/// Newline-joined line-protocol body for one request.
pub fn encode_batch(points: &[Point]) -> String {
    points
        .iter()
        .map(Point::to_line)
        .collect::<Vec<_>>()
        .join("\n")
}

impl PointSink for InfluxSink {
    async fn write(&mut self, points: &[Point]) -> Result<()> {
        for batch in points.chunks(self.batch_size) {
            let body = encode_batch(batch);
            self.client
                .post(self.write_url.clone())
                .body(body)
                .send()
                .await
                .with_context(|| format!("POST {}", self.write_url))?
                .error_for_status()
                .with_context(|| format!("InfluxDB rejected batch of {} lines", batch.len()))?;
            debug!(lines = batch.len(), "batch written");
        }
        info!(points = points.len(), url = %self.write_url, "points written");
        Ok(())
    }
}
