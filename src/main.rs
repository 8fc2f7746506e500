use anyhow::Result;
use dststat::{
    fetch::StatbankClient,
    pipeline::{self, LoadStatus},
    Config,
};
use std::{io, path::PathBuf};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    dststat::init_logging();
    info!("startup");

    // ─── 2) config: optional YAML path as the only argument ──────────
    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let cfg = Config::load(path.as_deref())?;
    info!(
        first_year = cfg.first_year,
        current_year = cfg.current_year,
        reference = %cfg.reference,
        "report through {}",
        cfg.current_year
    );

    let client = StatbankClient::new(&cfg.api_url, cfg.request_timeout())?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    // ─── 3) income per person: summary, charts, forecasts ────────────
    if let LoadStatus::NoData(reason) = pipeline::income_report(&client, &cfg, &mut out).await? {
        warn!(%reason, "income report skipped");
    }

    // ─── 4) population by country of origin ──────────────────────────
    if let LoadStatus::NoData(reason) = pipeline::population_report(&client, &cfg, &mut out).await? {
        warn!(%reason, "population report skipped");
    }

    // ─── 5) share of total income ────────────────────────────────────
    if let LoadStatus::NoData(reason) = pipeline::income_share_report(&client, &cfg, &mut out).await? {
        warn!(%reason, "income share report skipped");
    }

    info!("all done");
    Ok(())
}
