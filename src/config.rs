use anyhow::{Context, Result};
use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::Path};
use tracing::info;

use crate::fetch::DEFAULT_FEED_URL;

/// Optional overrides, read from the working directory when present.
pub const CONFIG_FILE: &str = "koroona.yaml";

/// Where derived series end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Influx,
    /// Print one series as CSV on stdout instead of writing to InfluxDB.
    Csv,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InfluxConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub measurement: String,
    pub batch_size: usize,
    /// Extra tags written ahead of the region tag on every point.
    pub tags: BTreeMap<String, String>,
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            host: "192.168.32.2".to_string(),
            port: 8086,
            database: "grafana".to_string(),
            measurement: "koroona".to_string(),
            batch_size: 10_000,
            tags: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed_url: String,
    pub output: OutputMode,
    /// Series printed in CSV mode.
    pub csv_series: String,
    pub influx: InfluxConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            output: OutputMode::Influx,
            csv_series: "r0".to_string(),
            influx: InfluxConfig::default(),
        }
    }
}

impl Config {
    /// Defaults, overridden by `path` if that file exists.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg: Config = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        info!(path = %path.display(), "config loaded");
        Ok(cfg)
    }
}
