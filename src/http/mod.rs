//! HTTP client module
//!
//! Provides the HTTP client used by [`crate::transport::HttpListTransport`].
//!
//! # Features
//!
//! - **Automatic Retries**: Configurable retry logic with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Backoff Strategies**: Constant, linear, and exponential backoff

mod client;
mod rate_limit;

pub use client::{default_user_agent, HttpClient, HttpClientConfig, RetryPolicy};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
