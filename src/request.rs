use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use tracing::{debug, warn};

use crate::{Error, FetchError, FetchFailure, Result};

/// Raw page bytes, or the reason the page could not be retrieved.
pub type FetchResult = core::result::Result<Vec<u8>, FetchError>;

/// Anything that can hand out a listing page by its 1-based index.
pub trait PageSource {
    fn fetch(&self, page: usize) -> impl Future<Output = FetchResult> + Send;
}

/// Fetches `{base}?page={n}` over HTTP. Only a `200 OK` counts as success.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    // Client uses Arc so we can clone cheaply
    client: Client,
    base: Url,
}

impl HttpFetcher {
    /// Builds a client whose per-request timeout surfaces as [`FetchFailure::Timeout`].
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        Ok(Self {
            client,
            base: parse_base_url(base_url)?,
        })
    }

    /// Appends `page={page}`, keeping any query the base already carries.
    pub fn page_url(&self, page: usize) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair("page", &page.to_string());
        url
    }
}

impl PageSource for HttpFetcher {
    fn fetch(&self, page: usize) -> impl Future<Output = FetchResult> + Send {
        let url = self.page_url(page);
        let request = self.client.get(url.clone());
        async move {
            let fail = |cause: FetchFailure| FetchError { page, cause };
            debug!(%url, "requesting page");

            let res = request.send().await.map_err(|e| fail(e.into()))?;
            let status = res.status();
            if status != StatusCode::OK {
                return Err(fail(FetchFailure::Status(status.as_u16())));
            }
            let body = res.bytes().await.map_err(|e| fail(e.into()))?;
            Ok(body.to_vec())
        }
    }
}

pub(crate) fn parse_base_url(base_url: &str) -> Result<Url> {
    let invalid = |reason: String| Error::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };
    let url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme `{other}`"))),
    }
}

/// Retries retryable failures of the wrapped source with linear backoff.
/// With `retries == 0` every page gets exactly one attempt.
#[derive(Debug, Clone)]
pub struct Retry<S> {
    inner: S,
    retries: u32,
    backoff: Duration,
}

impl<S> Retry<S> {
    pub fn new(inner: S, retries: u32, backoff: Duration) -> Self {
        Self {
            inner,
            retries,
            backoff,
        }
    }
}

impl<S: PageSource + Sync> PageSource for Retry<S> {
    fn fetch(&self, page: usize) -> impl Future<Output = FetchResult> + Send {
        async move {
            let mut attempt = 0;
            loop {
                match self.inner.fetch(page).await {
                    Err(err) if err.cause.is_retryable() && attempt < self.retries => {
                        attempt += 1;
                        warn!(page, attempt, cause = %err.cause, "retrying page");
                        tokio::time::sleep(self.backoff * attempt).await;
                    }
                    outcome => return outcome,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Fails with the given cause until `succeed_on` attempts have been made.
    struct Flaky {
        calls: AtomicUsize,
        succeed_on: usize,
        cause: FetchFailure,
    }

    impl PageSource for Flaky {
        fn fetch(&self, page: usize) -> impl Future<Output = FetchResult> + Send {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let cause = self.cause.clone();
            let succeed = call >= self.succeed_on;
            async move {
                if succeed {
                    Ok(b"ok".to_vec())
                } else {
                    Err(FetchError { page, cause })
                }
            }
        }
    }

    fn flaky(succeed_on: usize, cause: FetchFailure) -> Flaky {
        Flaky {
            calls: AtomicUsize::new(0),
            succeed_on,
            cause,
        }
    }

    #[test]
    fn page_url_appends_page_query() {
        let fetcher = HttpFetcher::new("https://example.com/jobs", Duration::from_secs(1)).unwrap();
        assert_eq!(
            fetcher.page_url(3).as_str(),
            "https://example.com/jobs?page=3"
        );

        let fetcher =
            HttpFetcher::new("https://example.com/jobs?q=rust", Duration::from_secs(1)).unwrap();
        assert_eq!(
            fetcher.page_url(1).as_str(),
            "https://example.com/jobs?q=rust&page=1"
        );
    }

    #[test]
    fn rejects_bad_base_urls() {
        assert!(matches!(
            parse_base_url("not a url"),
            Err(Error::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            parse_base_url("ftp://example.com/jobs"),
            Err(Error::InvalidBaseUrl { .. })
        ));
    }

    #[tokio::test]
    async fn no_retries_means_single_attempt() {
        let source = Retry::new(
            flaky(2, FetchFailure::Status(503)),
            0,
            Duration::from_millis(1),
        );
        let err = source.fetch(1).await.unwrap_err();
        assert_eq!(err.cause, FetchFailure::Status(503));
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_retryable_failures() {
        let source = Retry::new(flaky(3, FetchFailure::Timeout), 2, Duration::from_millis(1));
        assert_eq!(source.fetch(4).await.unwrap(), b"ok".to_vec());
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_failures_are_not_retried() {
        let source = Retry::new(
            flaky(2, FetchFailure::Status(404)),
            5,
            Duration::from_millis(1),
        );
        let err = source.fetch(2).await.unwrap_err();
        assert_eq!(err, FetchError { page: 2, cause: FetchFailure::Status(404) });
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 1);
    }
}
