//! Pagination types
//!
//! State, cursor and snapshot types shared by the paginator and its callers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Lifecycle state of a paginator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaginatorState {
    /// Ready to fetch the page at the cursor
    #[default]
    Idle,
    /// A request is in flight
    Fetching,
    /// The list has ended; no further requests are issued
    Exhausted,
    /// The last fetch failed; the same page is retried on the next call
    Failed,
}

impl PaginatorState {
    /// Check if `fetch_more` would issue a request in this state
    pub fn accepts_fetch(self) -> bool {
        matches!(self, Self::Idle | Self::Failed)
    }
}

impl fmt::Display for PaginatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Exhausted => "exhausted",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Number of pages consumed so far; `PageCursor::FIRST` is the first page
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PageCursor(pub u32);

impl PageCursor {
    /// Cursor of the first page
    pub const FIRST: Self = Self(0);

    /// Zero-based page index
    pub fn index(self) -> u32 {
        self.0
    }

    /// Cursor of the following page
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Check if this is the first page
    pub fn is_first(self) -> bool {
        self == Self::FIRST
    }
}

/// Tag distinguishing a paginator's state before and after each reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u64);

impl Generation {
    /// The generation that follows this one
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a paginator decides that a list has ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicy {
    /// A page shorter than the page size ends the list
    ///
    /// A full page always counts as "maybe more", so a list whose length is
    /// a multiple of the page size costs one trailing empty request.
    #[default]
    ShortPage,
    /// The backend's continuation flag ends the list when present,
    /// falling back to [`ExhaustionPolicy::ShortPage`] when absent.
    /// An empty page ends the list whatever the flag says.
    ServerFlag,
}

impl ExhaustionPolicy {
    /// Decide whether a page ends the list
    pub fn is_last_page(self, received: usize, page_size: u32, has_next: Option<bool>) -> bool {
        let short = received < page_size as usize;
        received == 0
            || match (self, has_next) {
                (Self::ServerFlag, Some(has_next)) => !has_next,
                _ => short,
            }
    }
}

/// Immutable view of a paginator at one point in time
#[derive(Debug)]
pub struct PageSnapshot<T> {
    /// Every item accumulated so far, in page arrival order
    pub items: Arc<Vec<T>>,
    /// False once the paginator is exhausted
    pub has_more: bool,
    /// State when the snapshot was taken
    pub state: PaginatorState,
    /// Cursor of the next page to request
    pub cursor: PageCursor,
    /// Generation the snapshot belongs to
    pub generation: Generation,
}

impl<T> PageSnapshot<T> {
    /// Number of accumulated items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if nothing has been accumulated
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Clone for PageSnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            has_more: self.has_more,
            state: self.state,
            cursor: self.cursor,
            generation: self.generation,
        }
    }
}
