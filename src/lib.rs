pub mod client;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod proxy;
pub mod scroll;
pub mod signing;
pub mod types;
pub mod upstream;
pub mod view;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::client::{PageSource, ProxyClient};
    pub use crate::config::CameoConfig;
    pub use crate::controller::{ContinuationPolicy, ListController, ListSnapshot, LoadOutcome};
    pub use crate::error::{ConfigError, FetchError, ProxyError};
    pub use crate::types::{CatalogItem, Page, PageRequest, RelatedItem, RelatedList, Thumbnail};
    pub use crate::view::{CardGrid, CardView, DetailModal, DetailView, GridStatus, ImageRef};
    pub use crate::Cameo;
}

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::client::ProxyClient;
use crate::config::CameoConfig;
use crate::controller::{ContinuationPolicy, ListController, ListSnapshot, LoadOutcome};
use crate::debounce::SearchDebouncer;
use crate::scroll::ScrollTrigger;
use crate::types::CatalogItem;
use crate::view::{CardGrid, DetailModal, DetailView};

/// Client-side entry point: a list controller talking to the proxy, plus the
/// modal selection.
pub struct Cameo {
    config: CameoConfig,
    list: Arc<ListController<ProxyClient>>,
    modal: DetailModal,
}

impl Cameo {
    pub fn new(config: CameoConfig) -> Result<Self> {
        Self::with_policy(config, ContinuationPolicy::default())
    }

    pub fn with_policy(config: CameoConfig, policy: ContinuationPolicy) -> Result<Self> {
        let client = ProxyClient::new(&config.proxy_url)
            .with_context(|| format!("invalid proxy url: {}", config.proxy_url))?;
        let list = Arc::new(ListController::with_policy(client, config.page_size, policy));
        Ok(Self { config, list, modal: DetailModal::default() })
    }

    pub fn config(&self) -> &CameoConfig { &self.config }
    pub fn controller(&self) -> &Arc<ListController<ProxyClient>> { &self.list }

    /// Initial unfiltered page.
    pub async fn start(&self) -> LoadOutcome { self.list.load_page(0, None).await }

    pub async fn load_more(&self) -> Option<LoadOutcome> { self.list.load_more().await }
    pub async fn search(&self, term: &str) -> LoadOutcome { self.list.search(term).await }
    pub async fn clear_search(&self) -> LoadOutcome { self.list.clear_search().await }

    /// Sentinel observer bound to this list.
    pub fn scroll_trigger(&self) -> ScrollTrigger { ScrollTrigger::attach(&self.list) }

    /// Keystroke debouncer bound to this list, using the configured delay.
    pub fn debouncer(&self) -> SearchDebouncer<ProxyClient> { SearchDebouncer::spawn(&self.list, self.config.debounce) }

    pub fn snapshot(&self) -> ListSnapshot { self.list.snapshot() }
    pub fn grid(&self) -> CardGrid { CardGrid::new(&self.list.snapshot(), &self.config.placeholder_image) }

    /// Select the item at `position` in the current list and open the modal.
    pub fn select(&mut self, position: usize) -> Option<&CatalogItem> {
        let item = self.list.items().into_iter().nth(position)?;
        self.modal.open(item);
        self.modal.selected()
    }

    pub fn close_detail(&mut self) { self.modal.close(); }
    pub fn detail(&self) -> Option<DetailView> { self.modal.view(&self.config.placeholder_image) }
}
