//! Page fetching with exponential backoff retry logic.
//!
//! # Architecture
//!
//! - [`PageFetch`]: core trait returning a page's text for a URL
//! - [`HttpFetch`]: `reqwest` client implementation
//! - [`RetryFetch`]: decorator that retries transient failures of any [`PageFetch`]
//!
//! # Retry Strategy
//!
//! - Only transient failures are retried (network errors, HTTP 429 and 5xx)
//! - Exponential backoff starting at the configured base delay
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to each delay

use crate::error::FetchError;
use rand::{Rng, rng};
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// Source of page text.
pub trait PageFetch {
    /// Fetch the page at `url` and return its body as text.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// [`PageFetch`] over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetch {
    client: reqwest::Client,
}

impl HttpFetch {
    /// Build a client with a per-request `timeout` and the given `User-Agent`.
    pub fn new(timeout: StdDuration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

impl PageFetch for HttpFetch {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let http = |source| FetchError::Http {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(http)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text().await.map_err(http)?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}

impl FetchError {
    /// Whether a later attempt could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Http { .. } => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`PageFetch`].
///
/// The delay between retries follows:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryFetch<T> {
    inner: T,
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
}

impl<T> RetryFetch<T>
where
    T: PageFetch,
{
    /// Creates a new `RetryFetch` wrapper.
    ///
    /// # Arguments
    ///
    /// * `inner` - The fetcher to wrap
    /// * `max_retries` - Retries after the first attempt
    /// * `base_delay` - Delay before the first retry; doubles on each attempt
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> PageFetch for RetryFetch<T>
where
    T: PageFetch,
{
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    attempt += 1;
                    let total_dt = total_t0.elapsed();

                    if !e.is_transient() || attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "fetch() giving up"
                        );
                        return Err(e);
                    }

                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1).min(16));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "fetch() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashMap;

    /// Serves canned pages; unknown URLs are 404s.
    #[derive(Debug, Default)]
    pub(crate) struct FakeFetch {
        pub pages: HashMap<String, String>,
        pub failures_before_success: Cell<usize>,
        pub calls: Cell<usize>,
    }

    impl FakeFetch {
        pub fn with_pages(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, body)| (url.to_string(), body.to_string()))
                    .collect(),
                ..Self::default()
            }
        }
    }

    impl PageFetch for FakeFetch {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.calls.set(self.calls.get() + 1);
            let remaining = self.failures_before_success.get();
            if remaining > 0 {
                self.failures_before_success.set(remaining - 1);
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: 503,
                });
            }
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failures() {
        let inner = FakeFetch::with_pages(&[("https://example.com/", "ok")]);
        inner.failures_before_success.set(2);
        let fetch = RetryFetch::new(inner, 3, StdDuration::from_millis(1));

        assert_eq!(fetch.fetch("https://example.com/").await.unwrap(), "ok");
        assert_eq!(fetch.inner.calls.get(), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_retries() {
        let inner = FakeFetch::with_pages(&[("https://example.com/", "ok")]);
        inner.failures_before_success.set(5);
        let fetch = RetryFetch::new(inner, 2, StdDuration::from_millis(1));

        assert!(fetch.fetch("https://example.com/").await.is_err());
        assert_eq!(fetch.inner.calls.get(), 3);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let fetch = RetryFetch::new(FakeFetch::default(), 3, StdDuration::from_millis(1));
        let err = fetch.fetch("https://example.com/missing").await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert_eq!(fetch.inner.calls.get(), 1);
    }

    #[test]
    fn test_transient_classification() {
        let status = |status| FetchError::Status {
            url: String::new(),
            status,
        };
        assert!(status(503).is_transient());
        assert!(status(429).is_transient());
        assert!(!status(404).is_transient());
    }
}
