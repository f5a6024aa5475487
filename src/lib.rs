//! Paginated job-listing scraper.
//!
//! Pages are fetched in order until the page bound or the first failure, every
//! job block is extracted into a [`JobRecord`], and the records are aggregated
//! into a CSV export and a skill tally.

mod error;
mod macros;

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod export;
pub mod paginate;
pub mod parse;
pub mod process;
pub mod record;
pub mod request;

pub use aggregate::{aggregate, tally_skills, SkillTally};
pub use config::{Cli, Config};
pub use error::{Error, FetchError, FetchFailure, Result};
pub use paginate::{Halt, Page, Pagination, Paginator};
pub use parse::{Extractor, Markers};
pub use process::{process_site, run, run_with_source, Report};
pub use record::{JobFields, JobRecord, NOT_AVAILABLE, UNKNOWN_LOCATION};
pub use request::{FetchResult, HttpFetcher, PageSource, Retry};

const DEFAULT_BASE_URL: &str = "https://example.com/jobs";
const DEFAULT_MAX_PAGES: usize = 5;
/// 1 means pages are fetched strictly one after another.
const DEFAULT_CONCURRENCY: usize = 1;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BACKOFF_MS: u64 = 500;
const FILE_PATH: &str = "jobs.csv";
const CHART_WIDTH: usize = 40;

pub const DEFAULT_SKILLS: [&str; 8] = [
    "Python",
    "Java",
    "SQL",
    "C",
    "C++",
    "React",
    "teamwork",
    "communication",
];
