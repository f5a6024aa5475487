use std::future::Future;
use std::sync::Arc;

use chrono::Local;
use tokio::sync::oneshot;
use tracing::warn;

use crate::aggregate::{aggregate, tally_skills, SkillTally};
use crate::chart::render_bar_chart;
use crate::config::{ChartTarget, Config};
use crate::export::save_csv;
use crate::paginate::{Halt, Paginator};
use crate::parse::{parse_page, Extractor};
use crate::record::JobRecord;
use crate::request::{HttpFetcher, PageSource, Retry};
use crate::{info_time, Result};

/// Everything the pipeline produced, including why pagination ended early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub records: Vec<JobRecord>,
    pub tally: SkillTally,
    pub pages_fetched: usize,
    pub halt: Option<Halt>,
}

/// Fetches, extracts and aggregates over HTTP, without touching the sinks.
pub async fn run(config: &Config, stop_rx: Option<oneshot::Receiver<()>>) -> Result<Report> {
    config.validate()?;
    let fetcher = HttpFetcher::new(&config.base_url, config.timeout)?;
    let source = Retry::new(fetcher, config.retries, config.backoff);
    run_with_source(source, config, stop_rx).await
}

/// Same as [`run`] but over any page source.
pub async fn run_with_source<S>(
    source: S,
    config: &Config,
    stop_rx: Option<oneshot::Receiver<()>>,
) -> Result<Report>
where
    S: PageSource + Send + Sync + 'static,
{
    let start_time = Local::now();
    // Fail on bad markers before any request goes out.
    let extractor = Arc::new(Extractor::new(config.markers.clone())?);

    let mut paginator = Paginator::new(source, config.max_pages).concurrency(config.concurrency);
    if let Some(stop_rx) = stop_rx {
        paginator = paginator.stop_signal(stop_rx);
    }
    let pagination = paginator.fetch_all().await;
    let pages_fetched = pagination.pages.len();

    let mut per_page = Vec::with_capacity(pages_fetched);
    for page in pagination.pages {
        per_page.push(parse_page(Arc::clone(&extractor), page).await?);
    }
    let records = aggregate(per_page);
    let tally = tally_skills(&records, &config.skills);

    info_time!(
        start_time,
        "Collected {} records from {} pages.",
        records.len(),
        pages_fetched
    );
    Ok(Report {
        records,
        tally,
        pages_fetched,
        halt: pagination.halt,
    })
}

/// Runs the pipeline, then writes the CSV export and the skill chart.
pub async fn process_site(config: &Config, stop_rx: Option<oneshot::Receiver<()>>) -> Result<Report> {
    let report = run(config, stop_rx).await?;
    write_sinks(config, &report)?;
    Ok(report)
}

/// Forwards the first interrupt to `stop_tx` so pagination ends at the next page
/// boundary. Returns `true` on a second interrupt, when the caller should exit
/// without waiting for pages still in flight. Returns `false` if listening fails.
pub async fn forward_interrupts<F, Fut>(mut next_interrupt: F, stop_tx: oneshot::Sender<()>) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if let Err(err) = next_interrupt().await {
        warn!(%err, "couldn't listen for interrupts");
        return false;
    }
    info_time!("received interrupt, finishing current pages");
    let _ = stop_tx.send(());

    match next_interrupt().await {
        Ok(()) => true,
        Err(err) => {
            warn!(%err, "couldn't listen for interrupts");
            false
        }
    }
}

pub(crate) fn write_sinks(config: &Config, report: &Report) -> Result<()> {
    let local_now = Local::now();
    if let Some(Halt::Failed(err)) = &report.halt {
        warn!(%err, "pagination ended early, exporting what was collected");
    }
    save_csv(&config.output, &report.records, config.layout)?;
    info_time!(
        local_now,
        "Wrote {} records to file: {}",
        report.records.len(),
        config.output.display()
    );

    let chart = render_bar_chart(&report.tally, config.chart_width);
    match &config.chart {
        ChartTarget::Stdout => print!("{chart}"),
        ChartTarget::File(path) => {
            std::fs::write(path, chart)?;
            info_time!("Wrote skill chart to: {}", path.display());
        }
        ChartTarget::Disabled => {}
    }
    Ok(())
}
