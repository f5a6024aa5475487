use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::export::Layout;
use crate::parse::Markers;
use crate::request::parse_base_url;
use crate::{
    Error, Result, CHART_WIDTH, DEFAULT_BACKOFF_MS, DEFAULT_BASE_URL, DEFAULT_CONCURRENCY,
    DEFAULT_MAX_PAGES, DEFAULT_SKILLS, DEFAULT_TIMEOUT_SECS, FILE_PATH,
};

/// Where the skill chart goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartTarget {
    Stdout,
    File(PathBuf),
    Disabled,
}

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub max_pages: usize,
    pub concurrency: usize,
    pub timeout: Duration,
    pub retries: u32,
    pub backoff: Duration,
    pub markers: Markers,
    pub skills: Vec<String>,
    pub output: PathBuf,
    pub layout: Layout,
    pub chart: ChartTarget,
    pub chart_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_pages: DEFAULT_MAX_PAGES,
            concurrency: DEFAULT_CONCURRENCY,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retries: 0,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
            markers: Markers::default(),
            skills: DEFAULT_SKILLS.iter().map(|s| s.to_string()).collect(),
            output: PathBuf::from(FILE_PATH),
            layout: Layout::Summary,
            chart: ChartTarget::Stdout,
            chart_width: CHART_WIDTH,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        parse_base_url(&self.base_url)?;
        if self.concurrency == 0 {
            return Err(Error::InvalidConfig("concurrency must be at least 1"));
        }
        Ok(())
    }
}

/// Scrape a paginated job listing into a CSV file and a skill chart.
#[derive(Parser, Debug, Clone)]
#[command(name = "jobscrape", version, about)]
pub struct Cli {
    /// Listing URL; pages are requested as `{url}?page={n}`
    #[arg(default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Highest page index to request
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    pub max_pages: usize,

    /// Pages requested at once
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Per-page request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Extra attempts for timeouts, transport errors, 429 and 5xx
    #[arg(long, default_value_t = 0)]
    pub retries: u32,

    /// Base delay between attempts in milliseconds, grows linearly
    #[arg(long, default_value_t = DEFAULT_BACKOFF_MS)]
    pub backoff_ms: u64,

    /// CSV output path
    #[arg(short, long, default_value = FILE_PATH)]
    pub output: PathBuf,

    /// Export every field instead of the four summary columns
    #[arg(long)]
    pub full: bool,

    /// Comma separated skill vocabulary
    #[arg(long, value_delimiter = ',')]
    pub skills: Option<Vec<String>>,

    /// Write the skill chart to this file instead of stdout
    #[arg(long, conflicts_with = "no_chart")]
    pub chart: Option<PathBuf>,

    /// Skip the skill chart
    #[arg(long)]
    pub no_chart: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let chart = match (cli.no_chart, cli.chart) {
            (true, _) => ChartTarget::Disabled,
            (false, Some(path)) => ChartTarget::File(path),
            (false, None) => ChartTarget::Stdout,
        };
        let defaults = Config::default();
        Self {
            base_url: cli.base_url,
            max_pages: cli.max_pages,
            concurrency: cli.concurrency,
            timeout: Duration::from_secs(cli.timeout_secs),
            retries: cli.retries,
            backoff: Duration::from_millis(cli.backoff_ms),
            skills: cli
                .skills
                .map(|skills| {
                    skills
                        .into_iter()
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.skills),
            output: cli.output,
            layout: if cli.full { Layout::Full } else { Layout::Summary },
            chart,
            ..defaults
        }
    }
}
