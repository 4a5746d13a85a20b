//! Transport types and traits
//!
//! Defines the boundary between the paginator and whatever performs the
//! network round-trip.

use crate::error::{Error, Result};
use crate::types::{JsonValue, QueryParams};
use async_trait::async_trait;
use std::fmt;
use url::Url;

/// An immutable list resource: a path (or absolute URL) plus fixed query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    path: String,
    fixed: QueryParams,
}

impl Endpoint {
    /// Create an endpoint for a path relative to the transport's base URL,
    /// or for an absolute `http(s)` URL
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if path.trim().is_empty() {
            return Err(Error::config("Endpoint path cannot be empty"));
        }
        if path.contains('?') {
            return Err(Error::config(format!(
                "Endpoint '{path}' must not embed a query string, use fixed parameters instead"
            )));
        }
        if path.contains("://") {
            Url::parse(&path)?;
        }
        Ok(Self {
            path,
            fixed: QueryParams::new(),
        })
    }

    /// Add a fixed query parameter sent with every request
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fixed.insert(key.into(), value.into());
        self
    }

    /// Path or URL of the resource
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters that never change for this endpoint
    pub fn fixed_query(&self) -> &QueryParams {
        &self.fixed
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        write_query(f, &self.fixed)
    }
}

/// One fully-resolved list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    /// Path or URL of the resource
    pub path: String,
    /// Complete query: fixed, filter and pagination parameters
    pub query: QueryParams,
}

impl ListRequest {
    /// Create a new list request
    pub fn new(path: impl Into<String>, query: QueryParams) -> Self {
        Self {
            path: path.into(),
            query,
        }
    }

    /// Get a query parameter value
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

impl fmt::Display for ListRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        write_query(f, &self.query)
    }
}

fn write_query(f: &mut fmt::Formatter<'_>, query: &QueryParams) -> fmt::Result {
    for (i, (key, value)) in query.iter().enumerate() {
        let sep = if i == 0 { '?' } else { '&' };
        write!(f, "{sep}{key}={value}")?;
    }
    Ok(())
}

/// One page of a list, normalized from the backend's response
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageResponse {
    /// Items of this page, in server order
    pub items: Vec<JsonValue>,
    /// Explicit continuation flag, when the backend supplies one
    pub has_next: Option<bool>,
    /// The decoded response body
    pub raw: JsonValue,
}

impl PageResponse {
    /// Create a page from its items
    pub fn new(items: Vec<JsonValue>) -> Self {
        Self {
            items,
            has_next: None,
            raw: JsonValue::Null,
        }
    }

    /// Attach an explicit continuation flag
    #[must_use]
    pub fn with_has_next(mut self, has_next: bool) -> Self {
        self.has_next = Some(has_next);
        self
    }

    /// Attach the raw response body
    #[must_use]
    pub fn with_raw(mut self, raw: JsonValue) -> Self {
        self.raw = raw;
        self
    }

    /// Number of items in this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the page has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Performs list requests
///
/// Implementations own status-code and envelope interpretation and must
/// report failures through the crate [`Error`] so the paginator can classify
/// them.
#[async_trait]
pub trait ListTransport: Send + Sync {
    /// Fetch one page
    async fn fetch_page(&self, request: &ListRequest) -> Result<PageResponse>;
}
