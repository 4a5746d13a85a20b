//! Pagination module
//!
//! Incremental loading of paged list endpoints.
//!
//! # Overview
//!
//! A [`Paginator`] owns the accumulated items, the cursor of the next page
//! and a lifecycle state. Each `fetch_more` call requests at most one page
//! through a [`ListTransport`](crate::transport::ListTransport); the
//! [`PageStrategy`] maps the cursor onto wire parameters and the
//! [`ExhaustionPolicy`] decides when the list has ended.

mod paginator;
mod strategies;
mod types;

pub use paginator::{Paginator, PaginatorBuilder, DEFAULT_PAGE_SIZE};
pub use strategies::{OffsetStrategy, PageNumberStrategy, PageStrategy, PaginationConfig};
pub use types::{ExhaustionPolicy, Generation, PageCursor, PageSnapshot, PaginatorState};
