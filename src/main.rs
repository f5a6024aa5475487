use chrono::Local;
use clap::Parser;
use jobscrape::process::forward_interrupts;
use jobscrape::{info_time, process_site, Cli, Config, Result};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let start_time = Local::now();
    let config: Config = Cli::parse().into();

    // First Ctrl-C stops pagination at the next page boundary and what was fetched is
    // still exported; a second one exits right away.
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        if forward_interrupts(tokio::signal::ctrl_c, stop_tx).await {
            std::process::exit(130);
        }
    });

    let report = process_site(&config, Some(stop_rx)).await?;
    info_time!(
        start_time,
        "Full program time: {} records from {} pages.",
        report.records.len(),
        report.pages_fetched
    );

    Ok(())
}
