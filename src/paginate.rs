use std::sync::Arc;

use chrono::Local;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::request::{FetchResult, PageSource};
use crate::{info_time, FetchError, FetchFailure};

/// A successfully retrieved page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub index: usize,
    pub body: Vec<u8>,
}

/// Why a walk ended before `max_pages`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Halt {
    Failed(FetchError),
    Cancelled { next_page: usize },
}

/// Outcome of a walk: every page before the halt point, in index order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    pub pages: Vec<Page>,
    pub halt: Option<Halt>,
}

impl Pagination {
    pub fn documents(&self) -> impl Iterator<Item = &[u8]> {
        self.pages.iter().map(|page| page.body.as_slice())
    }

    pub fn failure(&self) -> Option<&FetchError> {
        match &self.halt {
            Some(Halt::Failed(err)) => Some(err),
            _ => None,
        }
    }
}

/// Walks pages `1..=max_pages`, stopping at the first failure.
///
/// With a concurrency of `n`, pages are requested in windows of `n` consecutive
/// indices. Outcomes are still consumed in index order, so a page that finishes
/// early never gets past a lower page that failed.
pub struct Paginator<S> {
    source: Arc<S>,
    max_pages: usize,
    concurrency: usize,
    stop_rx: Option<oneshot::Receiver<()>>,
}

impl<S> Paginator<S>
where
    S: PageSource + Send + Sync + 'static,
{
    pub fn new(source: S, max_pages: usize) -> Self {
        Self {
            source: Arc::new(source),
            max_pages,
            concurrency: 1,
            stop_rx: None,
        }
    }

    /// Number of pages in flight at once. Values below 1 are treated as 1.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Once a value arrives no new window is started. A dropped sender is ignored.
    pub fn stop_signal(mut self, stop_rx: oneshot::Receiver<()>) -> Self {
        self.stop_rx = Some(stop_rx);
        self
    }

    pub async fn fetch_all(mut self) -> Pagination {
        let start_time = Local::now();
        let mut pagination = Pagination::default();
        let mut next_page = 1;

        while next_page <= self.max_pages {
            if self.stop_requested() {
                info!(next_page, "stop requested, ending pagination");
                pagination.halt = Some(Halt::Cancelled { next_page });
                break;
            }

            let last_page = next_page
                .saturating_add(self.concurrency - 1)
                .min(self.max_pages);
            if let Some(err) = self.fetch_window(next_page..=last_page, &mut pagination).await {
                warn!(page = err.page, cause = %err.cause, "error fetching page, stopping pagination");
                pagination.halt = Some(Halt::Failed(err));
                break;
            }
            match last_page.checked_add(1) {
                Some(page) => next_page = page,
                None => break,
            }
        }

        info_time!(
            start_time,
            "Fetched {} of {} pages.",
            pagination.pages.len(),
            self.max_pages
        );
        pagination
    }

    /// Requests every page of the window, then consumes outcomes in index order.
    /// Returns the first failure; anything requested after it is aborted.
    async fn fetch_window(
        &self,
        window: std::ops::RangeInclusive<usize>,
        pagination: &mut Pagination,
    ) -> Option<FetchError> {
        let handles: Vec<(usize, JoinHandle<FetchResult>)> = window
            .map(|index| {
                let source = Arc::clone(&self.source);
                (index, tokio::spawn(async move { source.fetch(index).await }))
            })
            .collect();

        let mut handles = handles.into_iter();
        while let Some((index, handle)) = handles.next() {
            let outcome = handle.await.unwrap_or_else(|join_err| {
                Err(FetchError {
                    page: index,
                    cause: FetchFailure::Task(join_err.to_string()),
                })
            });
            match outcome {
                Ok(body) => {
                    info!(page = index, bytes = body.len(), "fetched page");
                    pagination.pages.push(Page { index, body });
                }
                Err(err) => {
                    for (_, rest) in handles {
                        rest.abort();
                    }
                    return Some(err);
                }
            }
        }
        None
    }

    fn stop_requested(&mut self) -> bool {
        self.stop_rx
            .as_mut()
            .is_some_and(|stop_rx| stop_rx.try_recv().is_ok())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::Mutex;
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;

    /// Pages listed in `failures` fail with that status; every other page succeeds.
    /// Lower pages can be made slower so that later pages finish first.
    #[derive(Default)]
    struct Scripted {
        failures: HashMap<usize, u16>,
        delays: HashMap<usize, u64>,
        requested: Mutex<Vec<usize>>,
    }

    impl Scripted {
        fn failing(failures: &[(usize, u16)]) -> Self {
            Self {
                failures: failures.iter().copied().collect(),
                ..Default::default()
            }
        }
    }

    impl PageSource for Scripted {
        fn fetch(&self, page: usize) -> impl Future<Output = FetchResult> + Send {
            self.requested.lock().unwrap().push(page);
            let failure = self.failures.get(&page).copied();
            let delay = self.delays.get(&page).copied().unwrap_or(0);
            async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                match failure {
                    Some(code) => Err(FetchError {
                        page,
                        cause: FetchFailure::Status(code),
                    }),
                    None => Ok(format!("page {page}").into_bytes()),
                }
            }
        }
    }

    fn indices(pagination: &Pagination) -> Vec<usize> {
        pagination.pages.iter().map(|p| p.index).collect()
    }

    #[tokio::test]
    async fn fetches_every_page_in_order() {
        let pagination = Paginator::new(Scripted::default(), 4).fetch_all().await;
        assert_eq!(indices(&pagination), vec![1, 2, 3, 4]);
        assert_eq!(pagination.halt, None);
        assert_eq!(
            pagination.documents().next(),
            Some("page 1".as_bytes())
        );
    }

    #[tokio::test]
    async fn stops_at_first_failure_and_keeps_earlier_pages() {
        for failing in 1..=5 {
            let source = Scripted::failing(&[(failing, 500)]);
            let paginator = Paginator::new(source, 5);
            let source = Arc::clone(&paginator.source);
            let pagination = paginator.fetch_all().await;

            assert_eq!(pagination.pages.len(), failing - 1);
            assert_eq!(indices(&pagination), (1..failing).collect::<Vec<_>>());
            assert_eq!(
                pagination.failure(),
                Some(&FetchError {
                    page: failing,
                    cause: FetchFailure::Status(500)
                })
            );
            // No page after the failing one is ever requested.
            assert_eq!(*source.requested.lock().unwrap(), (1..=failing).collect::<Vec<_>>());
        }
    }

    #[tokio::test]
    async fn zero_pages_is_empty() {
        let pagination = Paginator::new(Scripted::default(), 0).fetch_all().await;
        assert_eq!(pagination, Pagination::default());
    }

    #[tokio::test]
    async fn concurrent_walk_discards_pages_after_failure() {
        let mut source = Scripted::failing(&[(3, 404)]);
        // Page 2 is the slowest, so pages 3 and 4 finish before it.
        source.delays.insert(2, 50);
        let pagination = Paginator::new(source, 6)
            .concurrency(4)
            .fetch_all()
            .await;

        assert_eq!(indices(&pagination), vec![1, 2]);
        assert_eq!(pagination.failure().map(|e| e.page), Some(3));
    }

    #[tokio::test]
    async fn concurrent_walk_spans_several_windows() {
        let pagination = Paginator::new(Scripted::default(), 7)
            .concurrency(3)
            .fetch_all()
            .await;
        assert_eq!(indices(&pagination), (1..=7).collect::<Vec<_>>());
        assert_eq!(pagination.halt, None);
    }

    #[tokio::test]
    async fn huge_concurrency_is_bounded_by_page_count() {
        let pagination = Paginator::new(Scripted::default(), 3)
            .concurrency(usize::MAX)
            .fetch_all()
            .await;
        assert_eq!(indices(&pagination), vec![1, 2, 3]);
        assert_eq!(pagination.halt, None);
    }

    #[tokio::test]
    async fn stop_signal_before_start_fetches_nothing() {
        let (stop_tx, stop_rx) = oneshot::channel();
        stop_tx.send(()).unwrap();
        let pagination = Paginator::new(Scripted::default(), 3)
            .stop_signal(stop_rx)
            .fetch_all()
            .await;
        assert!(pagination.pages.is_empty());
        assert_eq!(pagination.halt, Some(Halt::Cancelled { next_page: 1 }));
    }

    #[tokio::test]
    async fn dropped_stop_sender_does_not_interrupt() {
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        drop(stop_tx);
        let pagination = Paginator::new(Scripted::default(), 2)
            .stop_signal(stop_rx)
            .fetch_all()
            .await;
        assert_eq!(indices(&pagination), vec![1, 2]);
    }
}
