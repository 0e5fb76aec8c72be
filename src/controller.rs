//! Incremental list loading.
//!
//! [`ListState`] is the synchronous bookkeeping: offset, continuation flag,
//! loading flags and the request generation counter. [`ListController`]
//! pairs it with a [`PageSource`] and runs the fetches. The lock is never
//! held across an `.await`, so loads may overlap; only the completion whose
//! generation is the latest issued gets applied.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::watch;

use crate::client::PageSource;
use crate::error::FetchError;
use crate::types::{CatalogItem, Page, PageRequest};

/// How `has_more` is decided after a successful page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContinuationPolicy {
    /// A full page means there may be more.
    #[default]
    PageSizeHeuristic,
    /// Use the upstream `total` when present, else the heuristic.
    UpstreamTotal,
}

/// Result of one `load_page` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { received: usize },
    Failed,
    /// A newer request was issued meanwhile; this response was dropped.
    Stale,
}

/// Handle for an issued request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    request: PageRequest,
}

impl Ticket {
    pub fn generation(&self) -> u64 { self.generation }
    pub fn request(&self) -> &PageRequest { &self.request }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListSnapshot {
    pub items: Vec<CatalogItem>,
    pub offset: u32,
    pub has_more: bool,
    pub is_loading_more: bool,
    pub is_searching: bool,
    pub search_term: String,
}

#[derive(Debug)]
pub struct ListState {
    items: Vec<CatalogItem>,
    offset: u32,
    has_more: bool,
    is_loading_more: bool,
    is_searching: bool,
    search_term: String,
    page_size: u32,
    policy: ContinuationPolicy,
    issued: u64,
    pending: Option<u64>,
}

impl ListState {
    pub fn new(page_size: u32, policy: ContinuationPolicy) -> Self {
        Self {
            items: Vec::new(),
            offset: 0,
            has_more: true,
            is_loading_more: false,
            is_searching: false,
            search_term: String::new(),
            page_size: page_size.max(1),
            policy,
            issued: 0,
            pending: None,
        }
    }

    pub fn page_size(&self) -> u32 { self.page_size }
    pub fn offset(&self) -> u32 { self.offset }
    pub fn has_more(&self) -> bool { self.has_more }
    pub fn items(&self) -> &[CatalogItem] { &self.items }
    pub fn search_term(&self) -> &str { &self.search_term }
    pub fn is_loading(&self) -> bool { self.pending.is_some() }

    pub fn set_search_term(&mut self, term: &str) { self.search_term = term.to_string(); }

    /// Whether the scroll sentinel may request the next page.
    pub fn can_load_more(&self) -> bool {
        self.has_more && self.pending.is_none() && self.search_term.trim().is_empty()
    }

    /// Drop the current results and go back to the unfiltered start.
    pub fn reset(&mut self) {
        self.items.clear();
        self.offset = 0;
        self.has_more = true;
        self.search_term.clear();
    }

    /// Issue a new request. Any request still in flight becomes stale.
    pub fn begin(&mut self, offset: u32, search: Option<&str>) -> Ticket {
        self.issued += 1;
        let request = PageRequest::new(self.page_size, offset, search);
        self.is_searching = request.search.is_some();
        self.is_loading_more = !self.is_searching && offset > 0;
        self.pending = Some(self.issued);
        Ticket { generation: self.issued, request }
    }

    pub fn complete(&mut self, ticket: &Ticket, result: Result<Page, FetchError>) -> LoadOutcome {
        if ticket.generation != self.issued {
            tracing::debug!(generation = ticket.generation, latest = self.issued, "dropping stale page");
            return LoadOutcome::Stale;
        }
        self.pending = None;
        self.is_searching = false;
        self.is_loading_more = false;

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                tracing::warn!(error = %err, offset = ticket.request.offset, "page load failed; no more pages");
                self.has_more = false;
                return LoadOutcome::Failed;
            }
        };

        let mut received = page.items;
        received.truncate(self.page_size as usize);
        let count = received.len();
        if ticket.request.search.is_some() {
            self.items = received;
        } else {
            self.items.extend(received);
        }
        self.offset = ticket.request.offset.saturating_add(count as u32);
        let full_page = count == self.page_size as usize;
        self.has_more = match (self.policy, page.total) {
            (ContinuationPolicy::UpstreamTotal, Some(total)) => self.offset < total,
            _ => full_page,
        };
        LoadOutcome::Applied { received: count }
    }

    pub fn snapshot(&self) -> ListSnapshot {
        ListSnapshot {
            items: self.items.clone(),
            offset: self.offset,
            has_more: self.has_more,
            is_loading_more: self.is_loading_more,
            is_searching: self.is_searching,
            search_term: self.search_term.clone(),
        }
    }
}

/// Coordinates paging and searching against a [`PageSource`].
pub struct ListController<S> {
    source: S,
    state: Mutex<ListState>,
    settled: watch::Sender<u64>,
}

impl<S: PageSource> ListController<S> {
    pub fn new(source: S, page_size: u32) -> Self {
        Self::with_policy(source, page_size, ContinuationPolicy::default())
    }

    pub fn with_policy(source: S, page_size: u32, policy: ContinuationPolicy) -> Self {
        let (settled, _) = watch::channel(0);
        Self { source, state: Mutex::new(ListState::new(page_size, policy)), settled }
    }

    /// Ticks once per finished load, whatever its outcome. Closed when the
    /// controller is dropped.
    pub fn settled(&self) -> watch::Receiver<u64> {
        self.settled.subscribe()
    }

    fn state(&self) -> MutexGuard<'_, ListState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch one page. With a search term the list is replaced, otherwise
    /// the page is appended.
    pub async fn load_page(&self, offset: u32, search: Option<&str>) -> LoadOutcome {
        let ticket = self.state().begin(offset, search);
        self.run(ticket).await
    }

    async fn run(&self, ticket: Ticket) -> LoadOutcome {
        tracing::debug!(generation = ticket.generation, offset = ticket.request.offset, search = ?ticket.request.search, "loading page");
        let result = self.source.fetch_page(&ticket.request).await;
        let outcome = self.state().complete(&ticket, result);
        self.settled.send_modify(|n| *n += 1);
        outcome
    }

    /// Next page at the current offset, if the list allows it.
    pub async fn load_more(&self) -> Option<LoadOutcome> {
        let ticket = {
            let mut st = self.state();
            if !st.can_load_more() { return None; }
            let offset = st.offset();
            st.begin(offset, None)
        };
        Some(self.run(ticket).await)
    }

    /// Search from the first page. A blank term clears the search instead.
    pub async fn search(&self, term: &str) -> LoadOutcome {
        if term.trim().is_empty() {
            return self.clear_search().await;
        }
        let ticket = {
            let mut st = self.state();
            st.set_search_term(term);
            st.begin(0, Some(term))
        };
        self.run(ticket).await
    }

    /// Reset to the unfiltered first page.
    pub async fn clear_search(&self) -> LoadOutcome {
        let ticket = {
            let mut st = self.state();
            st.reset();
            st.begin(0, None)
        };
        self.run(ticket).await
    }

    pub fn set_search_term(&self, term: &str) { self.state().set_search_term(term); }
    pub fn can_load_more(&self) -> bool { self.state().can_load_more() }
    pub fn offset(&self) -> u32 { self.state().offset() }
    pub fn has_more(&self) -> bool { self.state().has_more() }
    pub fn items(&self) -> Vec<CatalogItem> { self.state().items().to_vec() }
    pub fn snapshot(&self) -> ListSnapshot { self.state().snapshot() }
}
