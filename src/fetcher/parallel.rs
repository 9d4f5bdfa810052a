use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::domain::{Feed, RawEntry};
use crate::fetcher::{FetchError, Fetcher};

pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub type FeedFetchResult = (Feed, Result<Vec<RawEntry>, FetchError>);

/// Fetches many feeds concurrently on a bounded pool, with a per-feed timeout.
pub struct ParallelFetcher {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    semaphore: Arc<Semaphore>,
    timeout: Duration,
}

impl ParallelFetcher {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        Self::with_workers(fetcher, DEFAULT_WORKERS)
    }

    pub fn with_workers(fetcher: Arc<dyn Fetcher + Send + Sync>, workers: usize) -> Self {
        Self {
            fetcher,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch every feed. Results come back in the order the feeds were given,
    /// one per feed, whether it succeeded or not.
    pub async fn fetch_all(&self, feeds: Vec<Feed>) -> Vec<FeedFetchResult> {
        let mut handles = Vec::with_capacity(feeds.len());

        for feed in &feeds {
            let fetcher = self.fetcher.clone();
            let semaphore = self.semaphore.clone();
            let timeout = self.timeout;
            let url = feed.url.clone();

            handles.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(e) => return Err(FetchError::Task(e.to_string())),
                };

                tracing::debug!("Fetching {}", url);
                match tokio::time::timeout(timeout, fetcher.fetch(&url)).await {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::Timeout(timeout.as_secs())),
                }
            }));
        }

        let joined = join_all(handles).await;

        feeds
            .into_iter()
            .zip(joined)
            .map(|(feed, joined)| match joined {
                Ok(result) => (feed, result),
                Err(e) => {
                    tracing::error!("Task join error for {}: {}", feed.url, e);
                    (feed, Err(FetchError::Task(e.to_string())))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    struct SlowFetcher {
        delays: HashMap<String, Duration>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl SlowFetcher {
        fn new(delays: &[(&str, u64)]) -> Self {
            Self {
                delays: delays
                    .iter()
                    .map(|(url, ms)| (url.to_string(), Duration::from_millis(*ms)))
                    .collect(),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Fetcher for SlowFetcher {
        async fn fetch(&self, location: &str) -> Result<Vec<RawEntry>, FetchError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            let delay = self.delays.get(location).copied().unwrap_or_default();
            tokio::time::sleep(delay).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![RawEntry {
                link: Some(location.to_string()),
                ..Default::default()
            }])
        }
    }

    fn feeds(urls: &[&str]) -> Vec<Feed> {
        urls.iter().map(|u| Feed::new(*u, "")).collect()
    }

    #[tokio::test]
    async fn test_results_keep_feed_order() {
        let fetcher = Arc::new(SlowFetcher::new(&[("a", 40), ("b", 0), ("c", 20)]));
        let parallel = ParallelFetcher::new(fetcher);

        let results = parallel.fetch_all(feeds(&["a", "b", "c"])).await;
        let urls: Vec<&str> = results.iter().map(|(f, _)| f.url.as_str()).collect();
        assert_eq!(urls, vec!["a", "b", "c"]);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
    }

    #[tokio::test]
    async fn test_worker_limit_bounds_concurrency() {
        let fetcher = Arc::new(SlowFetcher::new(&[("a", 20), ("b", 20), ("c", 20), ("d", 20)]));
        let parallel = ParallelFetcher::with_workers(fetcher.clone(), 2);

        parallel.fetch_all(feeds(&["a", "b", "c", "d"])).await;
        assert!(fetcher.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_timeout_fails_only_slow_feed() {
        let fetcher = Arc::new(SlowFetcher::new(&[("slow", 5_000), ("fast", 0)]));
        let parallel = ParallelFetcher::new(fetcher).with_timeout(Duration::from_millis(50));

        let results = parallel.fetch_all(feeds(&["slow", "fast"])).await;
        assert!(matches!(results[0].1, Err(FetchError::Timeout(_))));
        assert_eq!(results[1].1.as_ref().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_workers_still_progresses() {
        let fetcher = Arc::new(SlowFetcher::new(&[]));
        let parallel = ParallelFetcher::with_workers(fetcher, 0);

        let results = parallel.fetch_all(feeds(&["a"])).await;
        assert_eq!(results.len(), 1);
    }
}
