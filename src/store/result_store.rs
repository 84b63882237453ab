//! Result store implementation

use crate::error::Result;
use crate::pagination::{PageRequest, ResultPage};
use crate::source::PageSource;
use crate::types::{FetchStatus, TransactionView};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Observable state of the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    /// Status of the most recent fetch
    pub status: FetchStatus,
    /// Last successfully fetched page
    pub result: ResultPage<TransactionView>,
    /// Message of the most recent failure, cleared on success
    pub error: Option<String>,
    /// Request that produced `result`
    pub last_request: Option<PageRequest>,
    /// Request most recently dispatched
    pub pending_request: Option<PageRequest>,
    /// Number of completed fetches, successful or not
    pub completed: u64,
}

impl StoreSnapshot {
    /// Whether a fetch is in flight
    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }
}

/// Shared store of the last fetched transaction page
///
/// Does not reject overlapping fetches; callers gate dispatches with the
/// fetch guard. When overlapping fetches do happen, whichever completes
/// last wins, even if it was dispatched first.
pub struct ResultStore {
    source: Arc<dyn PageSource>,
    state: watch::Sender<StoreSnapshot>,
}

impl ResultStore {
    /// Create an idle store over a source
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        let (state, _) = watch::channel(StoreSnapshot::default());
        Self { source, state }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.borrow().clone()
    }

    /// Current status
    pub fn status(&self) -> FetchStatus {
        self.state.borrow().status
    }

    /// Receive every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.state.subscribe()
    }

    /// Run a fetch to completion and return the resulting status
    pub async fn fetch(&self, request: PageRequest) -> FetchStatus {
        self.begin(request);
        let outcome = self.source.fetch_page(request).await;
        self.complete(request, outcome)
    }

    /// Start a fetch in the background
    ///
    /// `Loading` is published before this returns.
    pub fn dispatch(self: &Arc<Self>, request: PageRequest) -> JoinHandle<FetchStatus> {
        self.begin(request);
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = store.source.fetch_page(request).await;
            store.complete(request, outcome)
        })
    }

    fn begin(&self, request: PageRequest) {
        info!(%request, "Fetching transactions");
        self.state.send_modify(|s| {
            s.status = FetchStatus::Loading;
            s.pending_request = Some(request);
        });
    }

    fn complete(
        &self,
        request: PageRequest,
        outcome: Result<ResultPage<TransactionView>>,
    ) -> FetchStatus {
        match outcome {
            Ok(page) => {
                info!(
                    %request,
                    rows = page.len(),
                    has_next_page = page.has_next_page,
                    "Fetch finished"
                );
                self.state.send_modify(|s| {
                    s.status = FetchStatus::Finished;
                    s.result = page;
                    s.error = None;
                    s.last_request = Some(request);
                    s.completed += 1;
                });
                FetchStatus::Finished
            }
            Err(e) => {
                warn!(%request, error = %e, "Fetch failed");
                self.state.send_modify(|s| {
                    s.status = FetchStatus::Error;
                    s.error = Some(e.to_string());
                    s.completed += 1;
                });
                FetchStatus::Error
            }
        }
    }
}

impl std::fmt::Debug for ResultStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultStore")
            .field("snapshot", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}
