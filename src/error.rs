use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The selector you are trying to scrape with is invalid. Selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid base url `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Csv Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Tokio Join Error, couldn't await a task! {0}")]
    RuntimeJoin(#[from] tokio::task::JoinError),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// A single page that could not be retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("page {page}: {cause}")]
pub struct FetchError {
    pub page: usize,
    pub cause: FetchFailure,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("unexpected status code {0}")]
    Status(u16),
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("fetch task was lost: {0}")]
    Task(String),
}

impl FetchFailure {
    /// Timeouts, transport errors, 429 and 5xx may succeed on a second attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchFailure::Status(code) => *code == 429 || (500..600).contains(code),
            FetchFailure::Timeout | FetchFailure::Transport(_) => true,
            FetchFailure::Task(_) => false,
        }
    }
}

impl From<reqwest::Error> for FetchFailure {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            FetchFailure::Timeout
        } else {
            FetchFailure::Transport(value.to_string())
        }
    }
}
