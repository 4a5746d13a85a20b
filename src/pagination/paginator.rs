//! The incremental list paginator
//!
//! A [`Paginator`] turns one paged list endpoint into a single growing
//! sequence. It is driven by `fetch_more` calls that may arrive faster than
//! round-trips complete: at most one request is in flight per generation,
//! and every other call returns the current snapshot untouched.
//!
//! # State machine
//!
//! ```text
//!            fetch_more                 full page
//!   Idle ───────────────▶ Fetching ─────────────────▶ Idle
//!    ▲                      │  │       short page
//!    │ success              │  └──────────────────▶ Exhausted
//!    │                      │ transient error
//!  Failed ◀─────────────────┘
//! ```
//!
//! `reset` returns any state to `Idle` with an empty accumulator and bumps
//! the generation; responses that belong to an older generation are
//! discarded when they arrive.

use super::strategies::{PageNumberStrategy, PageStrategy};
use super::types::{ExhaustionPolicy, Generation, PageCursor, PageSnapshot, PaginatorState};
use crate::error::{Error, ErrorKind, Result};
use crate::transport::{Endpoint, ListRequest, ListTransport, PageResponse};
use crate::types::QueryParams;
use futures::stream::{self, Stream, StreamExt};
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Page size used when none is configured
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Builder for [`Paginator`]
pub struct PaginatorBuilder<T> {
    transport: Arc<dyn ListTransport>,
    endpoint: Endpoint,
    page_size: u32,
    strategy: Arc<dyn PageStrategy>,
    policy: ExhaustionPolicy,
    filter: QueryParams,
    _item: PhantomData<fn() -> T>,
}

impl<T> PaginatorBuilder<T> {
    /// Set the number of items requested per page
    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the page strategy
    #[must_use]
    pub fn strategy(mut self, strategy: Arc<dyn PageStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the exhaustion policy
    #[must_use]
    pub fn policy(mut self, policy: ExhaustionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the variable filter parameters
    #[must_use]
    pub fn filter(mut self, filter: QueryParams) -> Self {
        self.filter = filter;
        self
    }

    /// Add one variable filter parameter
    #[must_use]
    pub fn filter_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter.insert(key.into(), value.into());
        self
    }

    /// Validate and build the paginator
    pub fn build(self) -> Result<Paginator<T>> {
        if self.page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be at least 1"));
        }

        let reserved = self.strategy.reserved_params();
        for key in self.endpoint.fixed_query().keys() {
            if key.is_empty() {
                return Err(Error::invalid_query(key, "parameter name cannot be empty"));
            }
            if reserved.contains(&key.as_str()) {
                return Err(Error::invalid_query(key, "reserved for pagination"));
            }
        }

        let paginator = Paginator {
            transport: self.transport,
            endpoint: self.endpoint,
            page_size: self.page_size,
            strategy: self.strategy,
            policy: self.policy,
            inner: Mutex::new(Inner::new(QueryParams::new(), Generation::default())),
        };
        paginator.validate_filter(&self.filter)?;
        lock(&paginator.inner).filter = self.filter;
        Ok(paginator)
    }
}

/// Incremental, exhaustion-aware loader for one list endpoint
pub struct Paginator<T> {
    transport: Arc<dyn ListTransport>,
    endpoint: Endpoint,
    page_size: u32,
    strategy: Arc<dyn PageStrategy>,
    policy: ExhaustionPolicy,
    inner: Mutex<Inner<T>>,
}

struct Inner<T> {
    filter: QueryParams,
    cursor: PageCursor,
    items: Arc<Vec<T>>,
    state: PaginatorState,
    generation: Generation,
}

impl<T> Inner<T> {
    fn new(filter: QueryParams, generation: Generation) -> Self {
        Self {
            filter,
            cursor: PageCursor::FIRST,
            items: Arc::new(Vec::new()),
            state: PaginatorState::Idle,
            generation,
        }
    }

    fn snapshot(&self) -> PageSnapshot<T> {
        PageSnapshot {
            items: Arc::clone(&self.items),
            has_more: self.state != PaginatorState::Exhausted,
            state: self.state,
            cursor: self.cursor,
            generation: self.generation,
        }
    }
}

fn lock<T>(inner: &Mutex<Inner<T>>) -> MutexGuard<'_, Inner<T>> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T> Paginator<T> {
    /// Start building a paginator over `endpoint`
    ///
    /// Defaults: [`DEFAULT_PAGE_SIZE`], [`PageNumberStrategy::default`],
    /// [`ExhaustionPolicy::ShortPage`], no filter.
    pub fn builder(transport: Arc<dyn ListTransport>, endpoint: Endpoint) -> PaginatorBuilder<T> {
        PaginatorBuilder {
            transport,
            endpoint,
            page_size: DEFAULT_PAGE_SIZE,
            strategy: Arc::new(PageNumberStrategy::default()),
            policy: ExhaustionPolicy::default(),
            filter: QueryParams::new(),
            _item: PhantomData,
        }
    }

    /// Endpoint this paginator reads
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Items requested per page
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Exhaustion policy in use
    pub fn policy(&self) -> ExhaustionPolicy {
        self.policy
    }

    /// Current state
    pub fn state(&self) -> PaginatorState {
        lock(&self.inner).state
    }

    /// Cursor of the next page to request
    pub fn cursor(&self) -> PageCursor {
        lock(&self.inner).cursor
    }

    /// Current generation
    pub fn generation(&self) -> Generation {
        lock(&self.inner).generation
    }

    /// Current variable filter parameters
    pub fn filter(&self) -> QueryParams {
        lock(&self.inner).filter.clone()
    }

    /// Number of accumulated items
    pub fn len(&self) -> usize {
        lock(&self.inner).items.len()
    }

    /// Check if nothing has been accumulated
    pub fn is_empty(&self) -> bool {
        lock(&self.inner).items.is_empty()
    }

    /// False once the list has ended
    pub fn has_more(&self) -> bool {
        lock(&self.inner).state != PaginatorState::Exhausted
    }

    /// Snapshot of the current state
    pub fn snapshot(&self) -> PageSnapshot<T> {
        lock(&self.inner).snapshot()
    }

    /// Start over with new filter parameters
    ///
    /// Equivalent to replacing this paginator with a fresh one: the cursor
    /// returns to the first page, the accumulator empties, the state becomes
    /// idle, and any request still in flight is ignored when it completes.
    /// An invalid filter is rejected without touching the paginator.
    pub fn reset(&self, filter: QueryParams) -> Result<PageSnapshot<T>> {
        self.validate_filter(&filter)?;
        Ok(self.restart(filter))
    }

    /// Start over with the current filter (pull-to-refresh)
    pub fn refresh(&self) -> PageSnapshot<T> {
        let filter = self.filter();
        self.restart(filter)
    }

    fn restart(&self, filter: QueryParams) -> PageSnapshot<T> {
        let mut inner = lock(&self.inner);
        let generation = inner.generation.next();
        if inner.state == PaginatorState::Fetching {
            debug!(
                "Reset of {} abandons the request in flight for generation {}",
                self.endpoint, inner.generation
            );
        }
        *inner = Inner::new(filter, generation);
        debug!("Reset {} to generation {}", self.endpoint, generation);
        inner.snapshot()
    }

    fn validate_filter(&self, filter: &QueryParams) -> Result<()> {
        let reserved = self.strategy.reserved_params();
        for key in filter.keys() {
            if key.is_empty() {
                return Err(Error::invalid_query(key, "parameter name cannot be empty"));
            }
            if reserved.contains(&key.as_str()) {
                return Err(Error::invalid_query(key, "reserved for pagination"));
            }
            if self.endpoint.fixed_query().contains_key(key) {
                return Err(Error::invalid_query(key, "fixed by the endpoint"));
            }
        }
        Ok(())
    }

    fn request_for(&self, inner: &Inner<T>) -> ListRequest {
        let mut query = self.endpoint.fixed_query().clone();
        query.extend(inner.filter.iter().map(|(k, v)| (k.clone(), v.clone())));
        query.extend(self.strategy.params(inner.cursor, self.page_size));
        ListRequest::new(self.endpoint.path(), query)
    }
}

impl<T> Paginator<T>
where
    T: DeserializeOwned + Clone + Send + Sync,
{
    /// Fetch the page at the cursor and append it
    ///
    /// Returns the current snapshot without issuing a request while another
    /// fetch is in flight or once the list is exhausted. A transient failure
    /// leaves items and cursor untouched and moves the paginator to
    /// [`PaginatorState::Failed`], so the next call retries the same page. A
    /// configuration failure leaves the state as it was. A response that
    /// arrives after a [`reset`](Self::reset) is discarded with
    /// [`Error::Superseded`].
    pub async fn fetch_more(&self) -> Result<PageSnapshot<T>> {
        let (request, issued, prior) = {
            let mut inner = lock(&self.inner);
            if !inner.state.accepts_fetch() {
                return Ok(inner.snapshot());
            }
            let request = self.request_for(&inner);
            let prior = inner.state;
            inner.state = PaginatorState::Fetching;
            (request, inner.generation, prior)
        };

        debug!("Fetching {} (generation {})", request, issued);
        let in_flight = InFlight {
            inner: &self.inner,
            generation: issued,
            prior,
            armed: true,
        };
        let outcome = self.transport.fetch_page(&request).await;
        in_flight.disarm();

        let mut inner = lock(&self.inner);
        if inner.generation != issued {
            debug!(
                "Discarding response for {} from generation {} (now {})",
                request, issued, inner.generation
            );
            return Err(Error::Superseded {
                issued: issued.0,
                current: inner.generation.0,
            });
        }

        match outcome.and_then(decode_page::<T>) {
            Ok((items, has_next)) => {
                let received = items.len();
                let last = self.policy.is_last_page(received, self.page_size, has_next);
                Arc::make_mut(&mut inner.items).extend(items);
                inner.cursor = inner.cursor.next();
                inner.state = if last {
                    PaginatorState::Exhausted
                } else {
                    PaginatorState::Idle
                };
                debug!(
                    "Applied {} items from {}, total {}, state {}",
                    received,
                    request,
                    inner.items.len(),
                    inner.state
                );
                Ok(inner.snapshot())
            }
            Err(err) if err.kind() == ErrorKind::Configuration => {
                inner.state = prior;
                warn!("Request {} rejected: {}", request, err);
                Err(err)
            }
            Err(err) => {
                inner.state = PaginatorState::Failed;
                warn!("Fetching {} failed: {}", request, err);
                Err(err)
            }
        }
    }

    /// Stream one snapshot per fetched page
    ///
    /// Ends after the page that exhausts the list, after the first error
    /// (which is yielded), or immediately if another caller has a fetch in
    /// flight.
    pub fn stream(&self) -> impl Stream<Item = Result<PageSnapshot<T>>> + '_ {
        stream::unfold(false, move |finished| async move {
            if finished || !self.state().accepts_fetch() {
                return None;
            }
            match self.fetch_more().await {
                Ok(snapshot) if snapshot.state == PaginatorState::Fetching => None,
                Ok(snapshot) => {
                    let finished = !snapshot.has_more;
                    Some((Ok(snapshot), finished))
                }
                Err(err) => Some((Err(err), true)),
            }
        })
    }

    /// Fetch pages until the list is exhausted or `max_pages` pages were fetched
    pub async fn fetch_all(&self, max_pages: Option<usize>) -> Result<PageSnapshot<T>> {
        if max_pages == Some(0) {
            return Ok(self.snapshot());
        }
        let pages = self.stream();
        futures::pin_mut!(pages);

        let mut fetched = 0;
        while let Some(page) = pages.next().await {
            page?;
            fetched += 1;
            if max_pages.is_some_and(|max| fetched >= max) {
                break;
            }
        }
        Ok(self.snapshot())
    }
}

impl<T> fmt::Debug for Paginator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("Paginator")
            .field("endpoint", &self.endpoint)
            .field("page_size", &self.page_size)
            .field("strategy", &self.strategy)
            .field("policy", &self.policy)
            .field("state", &inner.state)
            .field("cursor", &inner.cursor)
            .field("generation", &inner.generation)
            .field("items", &inner.items.len())
            .finish_non_exhaustive()
    }
}

/// Rolls `Fetching` back if a `fetch_more` future is dropped mid-request
struct InFlight<'a, T> {
    inner: &'a Mutex<Inner<T>>,
    generation: Generation,
    prior: PaginatorState,
    armed: bool,
}

impl<T> InFlight<'_, T> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<T> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = lock(self.inner);
        if inner.generation == self.generation && inner.state == PaginatorState::Fetching {
            inner.state = self.prior;
            debug!(
                "Fetch for generation {} cancelled, state back to {}",
                self.generation, self.prior
            );
        }
    }
}

/// Deserialize every item of a page, or none of them
fn decode_page<T: DeserializeOwned>(page: PageResponse) -> Result<(Vec<T>, Option<bool>)> {
    let items = page
        .items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item)
                .map_err(|e| Error::decode(format!("Item {index} of page: {e}")))
        })
        .collect::<Result<Vec<T>>>()?;
    Ok((items, page.has_next))
}
