use anyhow::Result;
use koroona::{
    config::{Config, OutputMode, CONFIG_FILE},
    fetch::{self, build_totals},
    pipeline::{derive_series, print_csv, publish},
    regions::RegionRegistry,
    sink::InfluxSink,
};
use reqwest::Client;
use std::io;
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();
    info!("startup");
    let start = Instant::now();

    // ─── 2) configure ────────────────────────────────────────────────
    let cfg = Config::load(CONFIG_FILE)?;
    let registry = RegionRegistry::estonia();
    let client = Client::new();

    // ─── 3) fetch & reshape ──────────────────────────────────────────
    info!(url = %cfg.feed_url, "fetching feed");
    let records = fetch::fetch_records(&client, &cfg.feed_url).await?;
    let totals = build_totals(&records);
    info!(dates = totals.dates().count(), cells = totals.len(), "totals ready");

    // ─── 4) derive ───────────────────────────────────────────────────
    let series = derive_series(&totals, registry);

    // ─── 5) output ───────────────────────────────────────────────────
    match cfg.output {
        OutputMode::Csv => {
            print_csv(io::stdout().lock(), &series, &cfg.csv_series, registry)?;
        }
        OutputMode::Influx => {
            let influx = &cfg.influx;
            let mut sink = InfluxSink::new(
                client,
                &influx.host,
                influx.port,
                &influx.database,
                influx.batch_size,
            )?;
            let written = publish(&mut sink, &series, &influx.measurement, &influx.tags).await?;
            info!(points = written, "written to influx");
        }
    }

    info!(elapsed = ?start.elapsed(), "all done");
    Ok(())
}
