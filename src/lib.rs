// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # July Paging
//!
//! Incremental, exhaustion-aware loading of the July app's paged lists.
//!
//! ## Features
//!
//! - **Paginator**: one growing list per endpoint, driven by `fetch_more`
//! - **Single flight**: calls that arrive mid-request return the current
//!   snapshot instead of issuing a second request
//! - **Stale response discard**: `reset` tags a new generation; late
//!   responses from the old one never touch the list
//! - **Typed resources**: filters and models for every July list endpoint
//! - **HTTP**: retries, backoff and rate limiting over reqwest
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use july_paging::{ApiClient, ClientConfig, TopicFilter};
//!
//! # async fn demo() -> july_paging::Result<()> {
//! let client = ApiClient::from_config(&ClientConfig::default())?;
//! let topics = client.paginator(&TopicFilter::default())?;
//!
//! // On mount and whenever the list scrolls to the bottom
//! let snapshot = topics.fetch_more().await?;
//! println!("{} topics, more: {}", snapshot.len(), snapshot.has_more);
//!
//! // Pull to refresh
//! topics.refresh();
//! topics.fetch_more().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  ApiClient: filter → Paginator<Item>     labels → cache   │
//! └───────────────────────────────────────────────────────────┘
//!                              │
//! ┌──────────────┬─────────────┴──────┬───────────────────────┐
//! │  Paginator   │   ListTransport    │   HttpClient          │
//! ├──────────────┼────────────────────┼───────────────────────┤
//! │ state/cursor │ Endpoint           │ Retry + backoff       │
//! │ generation   │ Envelope decoding  │ Rate limit            │
//! │ strategies   │                    │                       │
//! └──────────────┴────────────────────┴───────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP client with retry and rate limiting
pub mod http;

/// List transport and response envelopes
pub mod transport;

/// Paginator and page strategies
pub mod pagination;

/// UI-local override list
pub mod view;

/// Fill-once resource cache
pub mod cache;

/// July resources, filters and models
pub mod resources;

/// Client configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, ErrorKind, Result};
pub use types::*;

// Re-export commonly used types
pub use config::ClientConfig;
pub use pagination::{ExhaustionPolicy, PageSnapshot, Paginator, PaginatorState};
pub use resources::{
    ApiClient, CommentFilter, CustomAffirmationFilter, EmotionStatFilter, KnowledgeFilter,
    ListFilter, MyStarFilter, ResourceKind, StarFilter, TopicFilter,
};
pub use transport::{Endpoint, ListTransport};
pub use view::{Identify, ListView};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
