//! HTTP client behind the list transport
//!
//! Issues one GET per page against the API root and handles:
//! - Retries of throttled, 5xx, timed-out and refused requests
//! - Backoff between retries, or the server's `Retry-After` when it sends one
//! - Rate limiting shared by every paginator built from one client

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::error::{Error, Result};
use crate::types::{BackoffType, QueryParams};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// User agent sent when none is configured
pub fn default_user_agent() -> String {
    format!("july-paging/{}", env!("CARGO_PKG_VERSION"))
}

/// How failed requests are retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; zero surfaces every failure at once
    pub max_retries: u32,
    /// Growth of the delay between retries
    pub backoff: BackoffType,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            backoff: BackoffType::Exponential,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt`, counting from zero
    pub fn delay(&self, attempt: u32) -> Duration {
        let delay = match self.backoff {
            BackoffType::Constant => self.initial_delay,
            BackoffType::Linear => self.initial_delay.saturating_mul(attempt.saturating_add(1)),
            BackoffType::Exponential => self
                .initial_delay
                .saturating_mul(2u32.saturating_pow(attempt)),
        };
        delay.min(self.max_delay)
    }
}

/// Settings for an [`HttpClient`]
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// API root that relative paths are resolved against
    pub base_url: Url,
    /// Timeout for a single attempt
    pub timeout: Duration,
    /// Retry behavior
    pub retry: RetryPolicy,
    /// Client-side rate limit
    pub rate_limit: Option<RateLimiterConfig>,
    /// Headers sent with every request
    pub headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl HttpClientConfig {
    /// Defaults for a client rooted at `base_url`
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            rate_limit: None,
            headers: HashMap::new(),
            user_agent: default_user_agent(),
        }
    }
}

/// HTTP client with retry and rate limiting
pub struct HttpClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
    retry: RetryPolicy,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a client; fails on headers that are not valid HTTP
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .default_headers(header_map(&config.headers)?)
            .build()?;

        // A root without a trailing slash would lose its last segment on join
        let mut base_url = config.base_url;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            timeout: config.timeout,
            retry: config.retry,
            rate_limiter: config.rate_limit.as_ref().map(RateLimiter::new),
        })
    }

    /// The retry policy in use
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Resolve `path` against the API root; absolute URLs pass through
    pub fn resolve(&self, path: &str) -> Result<Url> {
        match Url::parse(path) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Ok(self.base_url.join(path.trim_start_matches('/'))?)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// GET `path` with `query` and return the response body
    ///
    /// Each attempt waits for the rate limiter. Retryable failures are
    /// retried up to the policy's limit, then the last error is returned.
    pub async fn get_text(&self, path: &str, query: &QueryParams) -> Result<String> {
        let url = self.resolve(path)?;
        let mut attempt = 0;

        loop {
            // Wait for rate limiter
            if let Some(limiter) = &self.rate_limiter {
                limiter.wait().await;
            }

            let failure = match self.attempt(&url, query).await {
                Ok(body) => return Ok(body),
                Err(failure) => failure,
            };

            if attempt >= self.retry.max_retries || !failure.error.is_retryable() {
                return Err(failure.error);
            }

            let delay = failure
                .retry_after
                .unwrap_or_else(|| self.retry.delay(attempt));
            attempt += 1;
            warn!(
                "GET {} failed: {}, retry {}/{} in {:?}",
                url, failure.error, attempt, self.retry.max_retries, delay
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// One request, without retries
    async fn attempt(&self, url: &Url, query: &QueryParams) -> std::result::Result<String, Failure> {
        // Build request
        let mut req = self.client.get(url.clone());
        if !query.is_empty() {
            req = req.query(query);
        }

        // Send request
        let response = req.send().await.map_err(|e| self.send_error(e))?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = retry_after(&response);
            return Err(Failure {
                error: Error::RateLimited {
                    retry_after_seconds: retry_after.map_or(0, |d| d.as_secs()),
                },
                retry_after,
            });
        }

        // Any other non-success status carries its body for the caller
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body).into());
        }

        debug!("GET {} -> {}", url, status.as_u16());
        response.text().await.map_err(|e| self.send_error(e))
    }

    fn send_error(&self, err: reqwest::Error) -> Failure {
        if err.is_timeout() {
            Error::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
            .into()
        } else {
            Error::Http(err).into()
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// A failed attempt, with the delay the server asked for if any
struct Failure {
    error: Error,
    retry_after: Option<Duration>,
}

impl From<Error> for Failure {
    fn from(error: Error) -> Self {
        Self {
            error,
            retry_after: None,
        }
    }
}

fn header_map(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| Error::invalid_value("http.headers", format!("'{key}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::invalid_value("http.headers", format!("'{key}': {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Seconds from a `Retry-After` header
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .map(Duration::from_secs)
}
