//! Page strategy implementations
//!
//! A strategy turns a cursor and page size into wire parameters.

use super::types::PageCursor;
use crate::error::{Error, Result};
use crate::types::QueryParams;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

/// Maps a cursor onto the query parameters of one page request
pub trait PageStrategy: Send + Sync + Debug {
    /// Query parameters selecting the page at `cursor`
    fn params(&self, cursor: PageCursor, page_size: u32) -> QueryParams;

    /// Parameter names this strategy owns; filters may not use them
    fn reserved_params(&self) -> Vec<&str>;
}

// ============================================================================
// Page Number Pagination
// ============================================================================

/// Page number pagination
///
/// The backend's native scheme: `?page=1&size=10`, pages counted from 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageNumberStrategy {
    /// Query parameter name for page number
    pub page_param: String,
    /// Query parameter name for page size
    pub size_param: String,
    /// First page number (usually 0 or 1)
    pub start_page: u32,
}

impl Default for PageNumberStrategy {
    fn default() -> Self {
        Self {
            page_param: "page".to_string(),
            size_param: "size".to_string(),
            start_page: 1,
        }
    }
}

impl PageNumberStrategy {
    /// Create a new page number strategy
    pub fn new(page_param: impl Into<String>, size_param: impl Into<String>, start_page: u32) -> Self {
        Self {
            page_param: page_param.into(),
            size_param: size_param.into(),
            start_page,
        }
    }
}

impl PageStrategy for PageNumberStrategy {
    fn params(&self, cursor: PageCursor, page_size: u32) -> QueryParams {
        let page = self.start_page.saturating_add(cursor.index());
        let mut params = QueryParams::new();
        params.insert(self.page_param.clone(), page.to_string());
        params.insert(self.size_param.clone(), page_size.to_string());
        params
    }

    fn reserved_params(&self) -> Vec<&str> {
        vec![self.page_param.as_str(), self.size_param.as_str()]
    }
}

// ============================================================================
// Offset Pagination
// ============================================================================

/// Offset-based pagination
///
/// Common patterns:
/// - `?offset=100&limit=50`
/// - `?skip=100&take=50`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetStrategy {
    /// Query parameter name for offset
    pub offset_param: String,
    /// Query parameter name for limit
    pub limit_param: String,
}

impl Default for OffsetStrategy {
    fn default() -> Self {
        Self {
            offset_param: "offset".to_string(),
            limit_param: "limit".to_string(),
        }
    }
}

impl OffsetStrategy {
    /// Create a new offset strategy
    pub fn new(offset_param: impl Into<String>, limit_param: impl Into<String>) -> Self {
        Self {
            offset_param: offset_param.into(),
            limit_param: limit_param.into(),
        }
    }
}

impl PageStrategy for OffsetStrategy {
    fn params(&self, cursor: PageCursor, page_size: u32) -> QueryParams {
        let offset = u64::from(cursor.index()) * u64::from(page_size);
        let mut params = QueryParams::new();
        params.insert(self.offset_param.clone(), offset.to_string());
        params.insert(self.limit_param.clone(), page_size.to_string());
        params
    }

    fn reserved_params(&self) -> Vec<&str> {
        vec![self.offset_param.as_str(), self.limit_param.as_str()]
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Declarative choice of page strategy, as written in the client config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum PaginationConfig {
    /// `page` / `size` parameters
    PageNumber {
        #[serde(default = "default_page_param")]
        page_param: String,
        #[serde(default = "default_size_param")]
        size_param: String,
        #[serde(default = "default_start_page")]
        start_page: u32,
    },
    /// `offset` / `limit` parameters
    Offset {
        #[serde(default = "default_offset_param")]
        offset_param: String,
        #[serde(default = "default_limit_param")]
        limit_param: String,
    },
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_size_param() -> String {
    "size".to_string()
}

fn default_start_page() -> u32 {
    1
}

fn default_offset_param() -> String {
    "offset".to_string()
}

fn default_limit_param() -> String {
    "limit".to_string()
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self::PageNumber {
            page_param: default_page_param(),
            size_param: default_size_param(),
            start_page: default_start_page(),
        }
    }
}

impl PaginationConfig {
    /// Build the strategy this config describes
    pub fn build(&self) -> Arc<dyn PageStrategy> {
        match self {
            Self::PageNumber {
                page_param,
                size_param,
                start_page,
            } => Arc::new(PageNumberStrategy::new(page_param, size_param, *start_page)),
            Self::Offset {
                offset_param,
                limit_param,
            } => Arc::new(OffsetStrategy::new(offset_param, limit_param)),
        }
    }

    /// Check that parameter names are usable
    pub fn validate(&self) -> Result<()> {
        let (first, second) = match self {
            Self::PageNumber {
                page_param,
                size_param,
                ..
            } => (page_param, size_param),
            Self::Offset {
                offset_param,
                limit_param,
            } => (offset_param, limit_param),
        };
        if first.is_empty() || second.is_empty() {
            return Err(Error::invalid_value(
                "pagination",
                "parameter names cannot be empty",
            ));
        }
        if first == second {
            return Err(Error::invalid_value(
                "pagination",
                format!("both parameters are named '{first}'"),
            ));
        }
        Ok(())
    }
}
